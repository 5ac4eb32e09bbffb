//! Support engine - entry point tying options, rules and the host port
//! together.
//!
//! Every `place_*` method is a pure function of its inputs and the answers
//! of the spatial port: nothing is cached between calls, so one engine can
//! serve any number of racks.

use crate::builders::{
    build_fixture_support, build_single_supports, build_strut_supports, build_tray_supports,
    BuildContext, Diagnostic, DiagnosticKind, PlacementOutcome,
};
use crate::error::{HangerError, HangerResult};
use crate::hardware::{HardwareKit, HardwareTotal};
use crate::options::SupportOptions;
use crate::rack::RackPlacementContext;
use crate::rules::ClassificationRules;
use crate::segment::{ElementId, FixtureHost, RunSegment, TrayRun};
use crate::spatial::SpatialQuery;

/// Support placement engine over a host spatial port
#[derive(Debug, Clone)]
pub struct SupportEngine<Q: SpatialQuery> {
    options: SupportOptions,
    rules: ClassificationRules,
    query: Q,
}

impl<Q: SpatialQuery> SupportEngine<Q> {
    /// Create an engine with default rules. Options are validated.
    pub fn new(options: SupportOptions, query: Q) -> HangerResult<Self> {
        options.validate()?;
        Ok(Self {
            options,
            rules: ClassificationRules::default(),
            query,
        })
    }

    /// Replace the classification rules. Rules are validated.
    pub fn with_rules(mut self, rules: ClassificationRules) -> HangerResult<Self> {
        rules.validate()?;
        self.rules = rules;
        Ok(self)
    }

    pub fn options(&self) -> &SupportOptions {
        &self.options
    }

    pub fn rules(&self) -> &ClassificationRules {
        &self.rules
    }

    pub fn query(&self) -> &Q {
        &self.query
    }

    fn context(&self) -> BuildContext<'_, Q> {
        BuildContext::new(&self.options, &self.rules, &self.query)
    }

    /// Single supports along each run
    pub fn place_single(&self, segments: &[RunSegment]) -> HangerResult<PlacementOutcome> {
        let ctx = self.context();
        let mut outcome = PlacementOutcome::new();
        for segment in segments {
            build_single_supports(&ctx, segment, &mut outcome)?;
        }
        log::info!(
            "placed {} single supports on {} runs ({} skipped)",
            outcome.supports.len(),
            segments.len(),
            outcome.skipped_points()
        );
        Ok(outcome)
    }

    /// Single supports along runs resolved through the host's segment lookup.
    /// Ids the host cannot resolve are recorded as diagnostics.
    pub fn place_single_runs(&self, ids: &[ElementId]) -> HangerResult<PlacementOutcome> {
        let mut segments = Vec::with_capacity(ids.len());
        let mut missing = Vec::new();
        for &id in ids {
            match self.query.segment(id)? {
                Some(segment) => segments.push(segment),
                None => missing.push(id),
            }
        }
        let mut outcome = self.place_single(&segments)?;
        for id in missing {
            outcome.record(
                Diagnostic::new(id, None, DiagnosticKind::SegmentNotFound),
                &self.rules.units,
            );
        }
        Ok(outcome)
    }

    /// One support above each fixture
    pub fn place_fixtures(&self, hosts: &[FixtureHost]) -> HangerResult<PlacementOutcome> {
        let ctx = self.context();
        let supports = hosts
            .iter()
            .map(|host| build_fixture_support(&ctx, host))
            .collect::<HangerResult<Vec<_>>>()?;
        Ok(PlacementOutcome {
            supports,
            diagnostics: Vec::new(),
        })
    }

    /// Strut supports across one conduit rack
    pub fn place_rack(&self, segments: &[RunSegment]) -> HangerResult<PlacementOutcome> {
        if segments.is_empty() {
            return Err(HangerError::NoSupportsProducible(
                "rack has no segments".to_string(),
            ));
        }
        let rack = RackPlacementContext::from_segments(segments, &self.rules)?;
        let mut outcome = PlacementOutcome::new();
        build_strut_supports(&self.context(), &rack, &mut outcome)?;
        log::info!(
            "rack on {}: {} tiers, {} struts ({} points skipped)",
            rack.leftmost.id,
            rack.tiers.len(),
            outcome.supports.len(),
            outcome.skipped_points()
        );
        Ok(outcome)
    }

    /// Strut supports across a rack whose runs are resolved through the
    /// host's segment lookup. Every id must resolve.
    pub fn place_rack_runs(&self, ids: &[ElementId]) -> HangerResult<PlacementOutcome> {
        let segments = ids
            .iter()
            .map(|&id| self.query.segment(id)?.ok_or(HangerError::SegmentNotFound(id)))
            .collect::<HangerResult<Vec<_>>>()?;
        self.place_rack(&segments)
    }

    /// Place several racks. A rack that fails does not affect the others.
    pub fn place_racks(&self, racks: &[Vec<RunSegment>]) -> Vec<HangerResult<PlacementOutcome>> {
        self.isolated("rack", racks, |rack| self.place_rack(rack))
    }

    /// Strut supports under a cable tray
    pub fn place_tray(&self, tray: &TrayRun) -> HangerResult<PlacementOutcome> {
        if tray.edge.left_normal().is_none() {
            return Err(HangerError::InvalidGeometry(format!(
                "tray {} is vertical or has no length",
                tray.id
            )));
        }
        let mut outcome = PlacementOutcome::new();
        build_tray_supports(&self.context(), tray, &mut outcome)?;
        Ok(outcome)
    }

    /// Place several trays. A tray that fails does not affect the others.
    pub fn place_trays(&self, trays: &[TrayRun]) -> Vec<HangerResult<PlacementOutcome>> {
        self.isolated("tray", trays, |tray| self.place_tray(tray))
    }

    /// Single supports with one result per run, so a failed query on one
    /// run does not discard the others.
    pub fn place_single_each(
        &self,
        segments: &[RunSegment],
    ) -> Vec<HangerResult<PlacementOutcome>> {
        self.isolated("run", segments, |segment| {
            self.place_single(std::slice::from_ref(segment))
        })
    }

    /// Fixture supports with one result per fixture
    pub fn place_fixtures_each(
        &self,
        hosts: &[FixtureHost],
    ) -> Vec<HangerResult<PlacementOutcome>> {
        self.isolated("fixture", hosts, |host| {
            self.place_fixtures(std::slice::from_ref(host))
        })
    }

    fn isolated<T>(
        &self,
        what: &str,
        items: &[T],
        place: impl Fn(&T) -> HangerResult<PlacementOutcome>,
    ) -> Vec<HangerResult<PlacementOutcome>> {
        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let result = place(item);
                if let Err(e) = &result {
                    log::warn!("{what} {i} failed: {e}");
                }
                result
            })
            .collect()
    }

    /// Hardware bill of materials for a set of outcomes
    pub fn hardware_total<'o>(
        &self,
        outcomes: impl IntoIterator<Item = &'o PlacementOutcome>,
        kit: &HardwareKit,
    ) -> HardwareTotal {
        let mut total = HardwareTotal::new();
        for outcome in outcomes {
            total.merge(&HardwareTotal::from_supports(&outcome.supports, &self.rules, kit));
        }
        total
    }
}
