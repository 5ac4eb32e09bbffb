//! Support builders.
//!
//! Each builder turns one run, rack, tray or fixture into support records,
//! recording a [`Diagnostic`] for every placement point it has to skip.

mod fixture;
mod single;
mod strut;
mod tray;

pub use fixture::build_fixture_support;
pub use single::build_single_supports;
pub use strut::build_strut_supports;
pub use tray::build_tray_supports;

use serde::{Deserialize, Serialize};

use crate::anchor::Classifier;
use crate::geometry::Point3;
use crate::options::SupportOptions;
use crate::rules::ClassificationRules;
use crate::segment::ElementId;
use crate::spatial::SpatialQuery;
use crate::supports::SupportRecord;
use crate::units::LengthFormat;

/// Inputs shared by every builder in one batch
pub struct BuildContext<'a, Q: SpatialQuery + ?Sized> {
    pub options: &'a SupportOptions,
    pub rules: &'a ClassificationRules,
    pub query: &'a Q,
}

impl<'a, Q: SpatialQuery + ?Sized> BuildContext<'a, Q> {
    pub fn new(options: &'a SupportOptions, rules: &'a ClassificationRules, query: &'a Q) -> Self {
        Self {
            options,
            rules,
            query,
        }
    }

    pub fn classifier(&self) -> Classifier<'a> {
        Classifier::new(self.rules, self.options.min_rod_length, self.options.ceiling_mode)
    }
}

/// Why a placement point was skipped or flagged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Run shorter than the host's minimum curve length
    DegenerateRun { length: f64 },
    /// Strut line between the outer runs is too short to place
    DegenerateStrut { length: f64 },
    /// Strut longer than the configured maximum span; the support is kept
    SpanExceeded { span: f64, max: f64 },
    /// Run id the host could not resolve
    SegmentNotFound,
}

impl DiagnosticKind {
    /// Operator-facing description with lengths in display units
    pub fn describe(&self, units: &dyn LengthFormat) -> String {
        match self {
            Self::DegenerateRun { length } => {
                format!("run is {} long, too short to support", units.format(*length))
            }
            Self::DegenerateStrut { length } => {
                format!("strut line is {} long, too short to place", units.format(*length))
            }
            Self::SpanExceeded { span, max } => format!(
                "strut spans {}, longer than the {} maximum",
                units.format(*span),
                units.format(*max)
            ),
            Self::SegmentNotFound => "run not found in host model".to_string(),
        }
    }
}

/// A problem recorded while building supports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Run, rack reference run, tray or fixture the problem belongs to
    pub host: ElementId,
    pub point: Option<Point3>,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn new(host: ElementId, point: Option<Point3>, kind: DiagnosticKind) -> Self {
        Self { host, point, kind }
    }

    /// Whether the support at this point was dropped
    pub fn is_skip(&self) -> bool {
        !matches!(self.kind, DiagnosticKind::SpanExceeded { .. })
    }
}

/// Supports built for one request together with their diagnostics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlacementOutcome {
    pub supports: Vec<SupportRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

impl PlacementOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of placement points that produced no support
    pub fn skipped_points(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_skip()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.supports.is_empty()
    }

    pub(crate) fn record(&mut self, diagnostic: Diagnostic, units: &dyn LengthFormat) {
        log::warn!(
            "support diagnostic on {}: {}",
            diagnostic.host,
            diagnostic.kind.describe(units)
        );
        self.diagnostics.push(diagnostic);
    }

    /// Append another outcome
    pub fn extend(&mut self, other: PlacementOutcome) {
        self.supports.extend(other.supports);
        self.diagnostics.extend(other.diagnostics);
    }
}
