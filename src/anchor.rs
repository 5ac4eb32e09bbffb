//! Anchor and attachment classification.
//!
//! Turns the collisions of a vertical ray into an anchor type, a rod length
//! and a rod-coupling count, and sizes the attachment for single supports.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::HangerResult;
use crate::geometry::{up, Point3};
use crate::rules::ClassificationRules;
use crate::segment::ElementId;
use crate::spatial::{Category, RayHit, RayQuery, SpatialQuery};

/// How the top of a rod is fixed to structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorType {
    ConcreteAnchor,
    BeamClamp,
    /// Beam clamp mounted close enough to the support that no rod fits
    CloseBeamClamp,
    /// Nothing found above the support
    None,
}

impl AnchorType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ConcreteAnchor => "Concrete Anchor",
            Self::BeamClamp => "Beam Clamp",
            Self::CloseBeamClamp => "Close Beam Clamp",
            Self::None => "None",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for AnchorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Hanger fitting that carries a single conduit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Clevis,
    Clip,
    LargeClip,
}

impl AttachmentKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Clevis => "Clevis Hanger",
            Self::Clip => "Conduit Clip",
            Self::LargeClip => "Large Conduit Clip",
        }
    }
}

impl Default for AttachmentKind {
    fn default() -> Self {
        Self::Clip
    }
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolved anchor at one end of a rod
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorDetail {
    pub anchor_type: AnchorType,
    /// Rod length, 0 when the structure is too close for a usable rod
    pub rod_length: f64,
    pub coupling_count: u32,
    /// Collision point on structure
    pub hit_point: Option<Point3>,
    /// Structural element the rod anchors to
    pub anchored_to: Option<ElementId>,
}

impl AnchorDetail {
    /// Detail for a ray that found nothing
    pub fn none() -> Self {
        Self {
            anchor_type: AnchorType::None,
            rod_length: 0.0,
            coupling_count: 0,
            hit_point: None,
            anchored_to: None,
        }
    }
}

/// Number of rod couplings needed to splice a rod of the given length
pub fn coupling_count(rod_length: f64, interval: f64) -> u32 {
    if interval <= 0.0 || rod_length <= 0.0 {
        return 0;
    }
    (rod_length / interval).floor() as u32
}

/// Pick the attachment for a conduit of the given diameter. Conduit larger
/// than the rule cutoff always gets the large clip.
pub fn attachment_for_diameter(
    preferred: AttachmentKind,
    diameter: Option<f64>,
    rules: &ClassificationRules,
) -> AttachmentKind {
    match diameter {
        Some(d) if d > rules.attachment_cutoff => AttachmentKind::LargeClip,
        _ => preferred,
    }
}

/// Anchor classifier bound to one rule set and one batch of options
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    rules: &'a ClassificationRules,
    min_rod_length: f64,
    ceiling_mode: bool,
}

impl<'a> Classifier<'a> {
    pub fn new(rules: &'a ClassificationRules, min_rod_length: f64, ceiling_mode: bool) -> Self {
        Self {
            rules,
            min_rod_length,
            ceiling_mode,
        }
    }

    /// Anchor type for a category; unknown categories get the rule default
    pub fn anchor_for(&self, category: Option<&Category>) -> AnchorType {
        category
            .and_then(|c| self.rules.anchor_for_category(c))
            .unwrap_or(self.rules.default_anchor)
    }

    /// Classify a set of collisions.
    ///
    /// The nearest collision wins. `extra_length` is added to the raw
    /// distance before minimum rod length pruning.
    pub fn classify(&self, hits: &[RayHit], extra_length: f64) -> AnchorDetail {
        let Some(nearest) = hits
            .iter()
            .filter(|h| h.distance.is_finite())
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
        else {
            return AnchorDetail::none();
        };

        let mut anchor_type = self.anchor_for(nearest.category.as_ref());
        if anchor_type == AnchorType::BeamClamp
            && nearest.distance < self.rules.close_clamp_distance
        {
            anchor_type = AnchorType::CloseBeamClamp;
        }

        let raw = nearest.distance + extra_length;
        let rod_length = if raw > self.min_rod_length { raw } else { 0.0 };

        AnchorDetail {
            anchor_type,
            rod_length,
            coupling_count: coupling_count(rod_length, self.rules.coupling_interval),
            hit_point: Some(nearest.point),
            anchored_to: Some(nearest.element),
        }
    }

    /// Cast from `origin` towards structure and classify what is found
    pub fn resolve<Q: SpatialQuery + ?Sized>(
        &self,
        query: &Q,
        origin: Point3,
        extra_length: f64,
        exclude: &[ElementId],
    ) -> HangerResult<AnchorDetail> {
        let direction = if self.ceiling_mode { -up() } else { up() };
        let ray = RayQuery::new(origin, direction, self.rules.obstruction_filter.clone())
            .excluding(exclude.iter().copied());
        let hits = query.cast_ray(&ray)?;
        let detail = self.classify(&hits, extra_length);
        log::debug!(
            "anchor at ({:.3}, {:.3}, {:.3}): {} hits -> {} rod {:.3}",
            origin.x,
            origin.y,
            origin.z,
            hits.len(),
            detail.anchor_type,
            detail.rod_length
        );
        Ok(detail)
    }
}
