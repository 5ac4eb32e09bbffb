//! Strut supports spanning a conduit rack

use std::collections::HashSet;

use crate::anchor::coupling_count;
use crate::error::HangerResult;
use crate::geometry::{Line, Point3};
use crate::placement::placement_points;
use crate::rack::{resolve_tier_spacings, RackPlacementContext, TierSpacing};
use crate::segment::ElementId;
use crate::spatial::SpatialQuery;
use crate::supports::{add_strap, ConduitStrap, StrutSupport, SupportRecord};

use super::{BuildContext, Diagnostic, DiagnosticKind, PlacementOutcome};

/// Rod length used when classification finds no usable rod
const MIN_RENDERED_ROD: f64 = 1.0;

/// Place strut supports across a conduit rack
pub fn build_strut_supports<Q: SpatialQuery + ?Sized>(
    ctx: &BuildContext<'_, Q>,
    rack: &RackPlacementContext,
    outcome: &mut PlacementOutcome,
) -> HangerResult<()> {
    let base = rack.base_elevation();
    let tier_spacings = if rack.tiers.len() >= 2 {
        resolve_tier_spacings(&rack.tiers, &rack.segments, ctx.rules.tier_tolerance)?
    } else {
        Vec::new()
    };
    let exclude: Vec<ElementId> = rack.segments.iter().map(|s| s.id).collect();
    let clearance = ctx.rules.max_rod_diameter + ctx.options.inside_rod_gap;

    for point in placement_points(
        rack.reference_line(),
        ctx.options.nominal_spacing,
        ctx.options.bend_spacing,
    ) {
        let left = rack.leftmost.line.project(&point);
        let right = rack.rightmost.line.project(&point);
        let raw = Line::new(left, right).at_elevation(base);

        let straps = resolve_straps(ctx, rack, &point);
        let Some(strut) = assemble_strut(
            ctx,
            StrutInput {
                host: rack.leftmost.id,
                origin: point,
                raw,
                extend_start: clearance + rack.leftmost.radius(),
                extend_end: clearance + rack.rightmost.radius(),
                straps,
                tier_spacings: tier_spacings.clone(),
                exclude: &exclude,
            },
            outcome,
        )?
        else {
            continue;
        };
        outcome.supports.push(SupportRecord::Strut(strut));
    }
    Ok(())
}

/// One strap per rack run passing over the support, merged by diameter
fn resolve_straps<Q: SpatialQuery + ?Sized>(
    ctx: &BuildContext<'_, Q>,
    rack: &RackPlacementContext,
    point: &Point3,
) -> Vec<ConduitStrap> {
    let mut claimed = HashSet::new();
    let mut straps = Vec::new();
    for seg in &rack.segments {
        if !claimed.insert(seg.id) {
            continue;
        }
        if !seg.line.spans(point, ctx.rules.tier_tolerance) {
            continue;
        }
        add_strap(&mut straps, &ctx.rules.size_label(seg.diameter));
    }
    straps
}

/// Geometry and context for one strut, before anchors are resolved
pub(super) struct StrutInput<'e> {
    pub host: ElementId,
    pub origin: Point3,
    /// Strut line between the outer faces it must span
    pub raw: Line,
    pub extend_start: f64,
    pub extend_end: f64,
    pub straps: Vec<ConduitStrap>,
    pub tier_spacings: Vec<TierSpacing>,
    pub exclude: &'e [ElementId],
}

/// Extend the strut, check its span and resolve anchors at both rods.
/// Returns `None` when the point has to be skipped.
pub(super) fn assemble_strut<Q: SpatialQuery + ?Sized>(
    ctx: &BuildContext<'_, Q>,
    input: StrutInput<'_>,
    outcome: &mut PlacementOutcome,
) -> HangerResult<Option<StrutSupport>> {
    let raw_length = input.raw.length();
    if raw_length < ctx.rules.min_curve_length {
        outcome.record(
            Diagnostic::new(
                input.host,
                Some(input.origin),
                DiagnosticKind::DegenerateStrut { length: raw_length },
            ),
            &ctx.rules.units,
        );
        return Ok(None);
    }

    let strut_line = input.raw.extended(input.extend_start, input.extend_end);
    let span = strut_line.length();
    if span > ctx.options.max_strut_span {
        outcome.record(
            Diagnostic::new(
                input.host,
                Some(input.origin),
                DiagnosticKind::SpanExceeded {
                    span,
                    max: ctx.options.max_strut_span,
                },
            ),
            &ctx.rules.units,
        );
    }

    let classifier = ctx.classifier();
    let start = classifier.resolve(ctx.query, strut_line.start, 0.0, input.exclude)?;
    let end = classifier.resolve(ctx.query, strut_line.end, 0.0, input.exclude)?;
    let couplings = coupling_count(
        start.rod_length + end.rod_length,
        ctx.rules.coupling_interval,
    );

    Ok(Some(StrutSupport {
        origin: input.origin,
        rod_lengths: [rendered_rod(start.rod_length), rendered_rod(end.rod_length)],
        rod_diameter: ctx.options.rod_diameter,
        coupling_count: couplings,
        strut_line,
        strut_size: ctx.options.strut_size.clone(),
        strut_length: span + 2.0 * ctx.options.outside_rod_extra,
        tier_spacings: input.tier_spacings,
        anchor_types: [start.anchor_type, end.anchor_type],
        straps: input.straps,
        linked_placement: None,
    }))
}

fn rendered_rod(length: f64) -> f64 {
    if length == 0.0 {
        MIN_RENDERED_ROD
    } else {
        length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::AnchorType;
    use crate::error::HangerError;
    use crate::options::SupportOptions;
    use crate::rules::ClassificationRules;
    use crate::segment::RunSegment;
    use crate::spatial::{Category, CategoryFilter, Obstruction, RayHit, RayQuery, Scene};
    use approx::assert_relative_eq;

    const TWO_INCH: f64 = 2.0 / 12.0;

    fn rack_segments() -> Vec<RunSegment> {
        vec![
            RunSegment::from_coords(1, [0.0, 0.0, 10.0], [30.0, 0.0, 10.0], TWO_INCH),
            RunSegment::from_coords(2, [0.0, 1.0, 10.0], [30.0, 1.0, 10.0], TWO_INCH),
            RunSegment::from_coords(3, [0.0, 0.5, 11.0], [30.0, 0.5, 11.0], 1.0 / 12.0),
        ]
    }

    fn slab_scene() -> Scene {
        Scene::new().with_obstruction(Obstruction::slab(
            100,
            Category::Floor,
            [-10.0, 40.0],
            [-10.0, 10.0],
            22.0,
            0.5,
        ))
    }

    fn struts(outcome: &PlacementOutcome) -> Vec<&StrutSupport> {
        outcome
            .supports
            .iter()
            .filter_map(|s| match s {
                SupportRecord::Strut(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_rack_struts() {
        let scene = slab_scene();
        let options = SupportOptions::default().with_spacing(8.0, 3.0);
        let rules = ClassificationRules::default();
        let ctx = BuildContext::new(&options, &rules, &scene);
        let rack = RackPlacementContext::from_segments(&rack_segments(), &rules).unwrap();

        let mut outcome = PlacementOutcome::new();
        build_strut_supports(&ctx, &rack, &mut outcome).unwrap();
        let struts = struts(&outcome);
        assert_eq!(struts.len(), 4);

        let first = struts[0];
        let clearance = rules.max_rod_diameter + options.inside_rod_gap + TWO_INCH / 2.0;
        assert_relative_eq!(first.strut_line.length(), 1.0 + 2.0 * clearance, epsilon = 1e-9);
        assert_relative_eq!(first.strut_line.start.z, 10.0);
        assert_relative_eq!(
            first.strut_length,
            first.strut_line.length() + 2.0 * options.outside_rod_extra,
            epsilon = 1e-9
        );
        assert_eq!(first.anchor_types, [AnchorType::ConcreteAnchor; 2]);
        assert_relative_eq!(first.rod_lengths[0], 12.0);
        assert_eq!(first.coupling_count, 2);

        assert_eq!(first.straps.len(), 2);
        let two = first.straps.iter().find(|s| s.diameter == "2\"").unwrap();
        assert_eq!(two.count, 2);
        let one = first.straps.iter().find(|s| s.diameter == "1\"").unwrap();
        assert_eq!(one.count, 1);

        assert_eq!(first.tier_spacings.len(), 1);
        assert_relative_eq!(first.tier_spacings[0].delta, 1.0);
        assert_relative_eq!(first.tier_spacings[0].radius, 1.0 / 24.0);
    }

    #[test]
    fn test_missing_structure_renders_unit_rod() {
        let scene = Scene::new();
        let options = SupportOptions::default();
        let rules = ClassificationRules::default();
        let ctx = BuildContext::new(&options, &rules, &scene);
        let rack = RackPlacementContext::from_segments(&rack_segments()[..2], &rules).unwrap();

        let mut outcome = PlacementOutcome::new();
        build_strut_supports(&ctx, &rack, &mut outcome).unwrap();
        let struts = struts(&outcome);
        assert!(!struts.is_empty());
        for strut in struts {
            assert_eq!(strut.rod_lengths, [1.0, 1.0]);
            assert_eq!(strut.coupling_count, 0);
            assert_eq!(strut.anchor_types, [AnchorType::None; 2]);
            assert!(strut.tier_spacings.is_empty());
        }
    }

    #[test]
    fn test_single_run_rack_is_degenerate() {
        let scene = Scene::new();
        let options = SupportOptions::default();
        let rules = ClassificationRules::default();
        let ctx = BuildContext::new(&options, &rules, &scene);
        let rack = RackPlacementContext::from_segments(&rack_segments()[..1], &rules).unwrap();

        let mut outcome = PlacementOutcome::new();
        build_strut_supports(&ctx, &rack, &mut outcome).unwrap();
        assert!(outcome.supports.is_empty());
        assert!(outcome.skipped_points() > 0);
        assert!(matches!(
            outcome.diagnostics[0].kind,
            DiagnosticKind::DegenerateStrut { .. }
        ));
    }

    #[test]
    fn test_wide_rack_flags_span() {
        let scene = Scene::new();
        let options = SupportOptions::default().with_strut(0.5, 0.0, 0.0);
        let rules = ClassificationRules::default();
        let ctx = BuildContext::new(&options, &rules, &scene);
        let rack = RackPlacementContext::from_segments(&rack_segments(), &rules).unwrap();

        let mut outcome = PlacementOutcome::new();
        build_strut_supports(&ctx, &rack, &mut outcome).unwrap();
        assert!(!outcome.supports.is_empty());
        assert_eq!(outcome.skipped_points(), 0);
        assert_eq!(outcome.diagnostics.len(), outcome.supports.len());
    }

    fn sorted(mut straps: Vec<ConduitStrap>) -> Vec<ConduitStrap> {
        straps.sort_by(|a, b| a.diameter.cmp(&b.diameter));
        straps
    }

    #[test]
    fn test_full_length_rack_straps_every_run() {
        let scene = slab_scene();
        let options = SupportOptions::default();
        let rules = ClassificationRules::default();
        let ctx = BuildContext::new(&options, &rules, &scene);
        let segments = rack_segments();
        let rack = RackPlacementContext::from_segments(&segments, &rules).unwrap();

        // every run covers every point: one entry per distinct diameter in the rack
        let mut expected = Vec::new();
        for seg in &segments {
            add_strap(&mut expected, &rules.size_label(seg.diameter));
        }
        let expected = sorted(expected);
        assert_eq!(expected.len(), 2);

        let mut outcome = PlacementOutcome::new();
        build_strut_supports(&ctx, &rack, &mut outcome).unwrap();
        let struts = struts(&outcome);
        assert!(!struts.is_empty());
        for strut in struts {
            assert_eq!(sorted(strut.straps.clone()), expected);
        }
    }

    #[test]
    fn test_short_run_strapped_where_it_covers() {
        let scene = slab_scene();
        let options = SupportOptions::default().with_spacing(8.0, 3.0);
        let rules = ClassificationRules::default();
        let ctx = BuildContext::new(&options, &rules, &scene);
        let mut segments = rack_segments();
        segments.push(RunSegment::from_coords(4, [0.0, 0.5, 10.0], [5.0, 0.5, 10.0], 1.0 / 12.0));
        let rack = RackPlacementContext::from_segments(&segments, &rules).unwrap();

        let mut outcome = PlacementOutcome::new();
        build_strut_supports(&ctx, &rack, &mut outcome).unwrap();
        let struts = struts(&outcome);
        assert_eq!(struts.len(), 4);

        let one_inch = |strut: &StrutSupport| {
            strut
                .straps
                .iter()
                .find(|s| s.diameter == "1\"")
                .map_or(0, |s| s.count)
        };
        assert_eq!(one_inch(struts[0]), 2);
        for strut in &struts[1..] {
            assert_eq!(one_inch(strut), 1);
            assert_eq!(strut.strap_count(), 3);
        }
    }

    struct Unavailable;

    impl SpatialQuery for Unavailable {
        fn cast_ray(&self, _query: &RayQuery) -> HangerResult<Vec<RayHit>> {
            Err(HangerError::SpatialQuery("host unavailable".to_string()))
        }

        fn cast_sphere(
            &self,
            _center: &Point3,
            _radius: f64,
            _filter: &CategoryFilter,
        ) -> HangerResult<Vec<ElementId>> {
            Ok(Vec::new())
        }

        fn segment(&self, _id: ElementId) -> HangerResult<Option<RunSegment>> {
            Ok(None)
        }
    }

    #[test]
    fn test_query_failure_propagates() {
        let options = SupportOptions::default();
        let rules = ClassificationRules::default();
        let ctx = BuildContext::new(&options, &rules, &Unavailable);
        let rack = RackPlacementContext::from_segments(&rack_segments(), &rules).unwrap();

        let mut outcome = PlacementOutcome::new();
        let err = build_strut_supports(&ctx, &rack, &mut outcome);
        assert!(matches!(err, Err(HangerError::SpatialQuery(_))));
    }
}
