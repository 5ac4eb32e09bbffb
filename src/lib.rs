//! Hanger Engine - support placement and hardware takeoff for conduit runs
//!
//! Given straight conduit runs, racks of parallel runs, cable trays or point
//! fixtures, the engine works out where hangers go, what each rod anchors
//! into and how long it is, and totals the hardware needed to build them:
//! - Placement points along a run (end offsets plus rebalanced spans)
//! - Anchor classification from an upward (or downward) ray cast
//! - Strut supports across multi-tier racks and under cable trays
//! - A merged bill of materials
//!
//! The host model is reached only through the [`spatial::SpatialQuery`]
//! port, so the engine itself is a pure function of its inputs.
//!
//! ## Example
//! ```rust
//! use hanger_engine::prelude::*;
//!
//! let scene = Scene::new().with_obstruction(Obstruction::slab(
//!     100,
//!     Category::Floor,
//!     [-50.0, 50.0],
//!     [-50.0, 50.0],
//!     12.0,
//!     0.5,
//! ));
//!
//! let engine = SupportEngine::new(SupportOptions::default(), &scene).unwrap();
//!
//! let run = RunSegment::from_coords(1, [0.0, 0.0, 10.0], [30.0, 0.0, 10.0], 1.0 / 12.0);
//! let outcome = engine.place_single(&[run]).unwrap();
//! assert!(!outcome.supports.is_empty());
//!
//! let bom = engine.hardware_total([&outcome], &HardwareKit::default());
//! assert!(bom.category_count(HardwareCategory::Anchor) > 0);
//! ```

pub mod anchor;
pub mod builders;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod hardware;
pub mod options;
pub mod placement;
pub mod rack;
pub mod rules;
pub mod segment;
pub mod spatial;
pub mod supports;
pub mod units;

// Re-export common types
pub mod prelude {
    pub use crate::anchor::{AnchorDetail, AnchorType, AttachmentKind, Classifier};
    pub use crate::builders::{Diagnostic, DiagnosticKind, PlacementOutcome};
    pub use crate::engine::SupportEngine;
    pub use crate::error::{HangerError, HangerResult};
    pub use crate::geometry::{Line, Point3, Vec3};
    pub use crate::hardware::{
        HardwareCategory, HardwareKey, HardwareKit, HardwareTotal, LineItem,
    };
    pub use crate::options::SupportOptions;
    pub use crate::placement::{placement_distances, placement_points};
    pub use crate::rack::{RackPlacementContext, TierSpacing};
    pub use crate::rules::{AnchorRule, ClassificationRules};
    pub use crate::segment::{ElementId, FixtureHost, RunSegment, TrayRun};
    pub use crate::spatial::{
        Category, CategoryFilter, Obstruction, RayHit, RayQuery, Scene, SpatialQuery,
    };
    pub use crate::supports::{
        ConduitStrap, FixtureSupport, SingleSupport, StrutSupport, SupportRecord,
    };
    pub use crate::units::{FeetInches, LengthFormat};
}
