//! Support records produced by the builders

use serde::{Deserialize, Serialize};

use crate::anchor::{AnchorType, AttachmentKind};
use crate::error::{HangerError, HangerResult};
use crate::geometry::{Line, Point3};
use crate::rack::TierSpacing;
use crate::segment::ElementId;

/// Conduit straps of one diameter on a strut support
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConduitStrap {
    pub diameter: String,
    pub count: u32,
}

/// Add one strap of `diameter`, merging with an existing entry
pub fn add_strap(straps: &mut Vec<ConduitStrap>, diameter: &str) {
    match straps.iter_mut().find(|s| s.diameter == diameter) {
        Some(strap) => strap.count += 1,
        None => straps.push(ConduitStrap {
            diameter: diameter.to_string(),
            count: 1,
        }),
    }
}

/// Single-rod support carrying one conduit run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleSupport {
    pub origin: Point3,
    pub rod_length: f64,
    pub rod_diameter: f64,
    pub coupling_count: u32,
    pub attachment: AttachmentKind,
    pub attachment_size: String,
    pub anchor_type: AnchorType,
    pub host: ElementId,
    #[serde(default)]
    pub linked_placement: Option<ElementId>,
}

/// Single-rod support hung above a point fixture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureSupport {
    pub origin: Point3,
    pub rod_length: f64,
    pub rod_diameter: f64,
    pub coupling_count: u32,
    pub anchor_type: AnchorType,
    pub host: ElementId,
    #[serde(default)]
    pub linked_placement: Option<ElementId>,
}

/// Strut spanning a rack, hung from two rods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrutSupport {
    pub origin: Point3,
    /// Rod lengths at the strut start and end
    pub rod_lengths: [f64; 2],
    pub rod_diameter: f64,
    /// Couplings for both rods together
    pub coupling_count: u32,
    /// Strut line between the two rods
    pub strut_line: Line,
    pub strut_size: String,
    /// Cut length of the strut channel, including the stub past each rod
    pub strut_length: f64,
    pub tier_spacings: Vec<TierSpacing>,
    pub anchor_types: [AnchorType; 2],
    pub straps: Vec<ConduitStrap>,
    #[serde(default)]
    pub linked_placement: Option<ElementId>,
}

impl StrutSupport {
    /// Offset of every tier above the first, measured from the first.
    ///
    /// Each transition contributes its gap (`delta - radius`) once.
    pub fn tier_offsets(&self) -> Vec<f64> {
        self.tier_spacings
            .iter()
            .scan(0.0, |acc, spacing| {
                *acc += spacing.gap();
                Some(*acc)
            })
            .collect()
    }

    pub fn total_rod_length(&self) -> f64 {
        self.rod_lengths.iter().sum()
    }

    pub fn strap_count(&self) -> u32 {
        self.straps.iter().map(|s| s.count).sum()
    }
}

/// Any support produced by a builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SupportRecord {
    Single(SingleSupport),
    Fixture(FixtureSupport),
    Strut(StrutSupport),
}

impl SupportRecord {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Single(_) => "single",
            Self::Fixture(_) => "fixture",
            Self::Strut(_) => "strut",
        }
    }

    pub fn origin(&self) -> Point3 {
        match self {
            Self::Single(s) => s.origin,
            Self::Fixture(s) => s.origin,
            Self::Strut(s) => s.origin,
        }
    }

    pub fn coupling_count(&self) -> u32 {
        match self {
            Self::Single(s) => s.coupling_count,
            Self::Fixture(s) => s.coupling_count,
            Self::Strut(s) => s.coupling_count,
        }
    }

    pub fn total_rod_length(&self) -> f64 {
        match self {
            Self::Single(s) => s.rod_length,
            Self::Fixture(s) => s.rod_length,
            Self::Strut(s) => s.total_rod_length(),
        }
    }

    pub fn linked_placement(&self) -> Option<ElementId> {
        match self {
            Self::Single(s) => s.linked_placement,
            Self::Fixture(s) => s.linked_placement,
            Self::Strut(s) => s.linked_placement,
        }
    }

    /// Record the id of the element the host placed for this support.
    /// The id can only be set once.
    pub fn link_placement(&mut self, id: ElementId) -> HangerResult<()> {
        let slot = match self {
            Self::Single(s) => &mut s.linked_placement,
            Self::Fixture(s) => &mut s.linked_placement,
            Self::Strut(s) => &mut s.linked_placement,
        };
        if let Some(existing) = slot {
            return Err(HangerError::AlreadyLinked(*existing));
        }
        *slot = Some(id);
        Ok(())
    }
}
