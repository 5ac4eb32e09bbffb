//! Rack context and tier spacing resolution

use serde::{Deserialize, Serialize};

use crate::error::{HangerError, HangerResult};
use crate::geometry::{Line, Vec3};
use crate::rules::ClassificationRules;
use crate::segment::RunSegment;

/// Spacing between one tier and the tier below it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierSpacing {
    /// Raw elevation difference between the two tiers
    pub delta: f64,
    /// Radius of the largest conduit on the upper tier
    pub radius: f64,
}

impl TierSpacing {
    /// Strut-face to strut-face gap
    pub fn gap(&self) -> f64 {
        self.delta - self.radius
    }
}

/// Per-rack input derived once from the rack's segments.
///
/// Tiers are sorted by ascending elevation, de-duplicated within the rule
/// tolerance and capped at the rule maximum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RackPlacementContext {
    pub leftmost: RunSegment,
    pub rightmost: RunSegment,
    /// One representative segment per tier, lowest first
    pub tiers: Vec<RunSegment>,
    pub segments: Vec<RunSegment>,
}

impl RackPlacementContext {
    pub fn from_segments(
        segments: &[RunSegment],
        rules: &ClassificationRules,
    ) -> HangerResult<Self> {
        let reference = segments
            .iter()
            .find(|s| !s.line.is_degenerate(rules.min_curve_length))
            .ok_or_else(|| {
                HangerError::NoSupportsProducible("rack has no usable segments".to_string())
            })?;
        let normal = reference.line.left_normal().ok_or_else(|| {
            HangerError::NoSupportsProducible(format!(
                "rack reference segment {} is vertical",
                reference.id
            ))
        })?;

        let origin = reference.line.start;
        let offset = |s: &RunSegment| (s.line.midpoint() - origin).dot(&normal);

        let leftmost = segments
            .iter()
            .max_by(|a, b| offset(a).total_cmp(&offset(b)))
            .cloned()
            .unwrap_or_else(|| reference.clone());
        let rightmost = segments
            .iter()
            .min_by(|a, b| offset(a).total_cmp(&offset(b)))
            .cloned()
            .unwrap_or_else(|| reference.clone());

        let tiers = group_tiers(segments, rules);
        Ok(Self {
            leftmost,
            rightmost,
            tiers,
            segments: segments.to_vec(),
        })
    }

    /// Line supports are laid out along
    pub fn reference_line(&self) -> &Line {
        &self.leftmost.line
    }

    /// Horizontal direction across the rack, from right to left
    pub fn across(&self) -> Option<Vec3> {
        self.leftmost.line.left_normal()
    }

    pub fn base_elevation(&self) -> f64 {
        self.tiers
            .first()
            .map(RunSegment::elevation)
            .unwrap_or_else(|| self.leftmost.elevation())
    }
}

fn group_tiers(segments: &[RunSegment], rules: &ClassificationRules) -> Vec<RunSegment> {
    let mut sorted: Vec<&RunSegment> = segments.iter().collect();
    sorted.sort_by(|a, b| a.elevation().total_cmp(&b.elevation()));

    let mut tiers: Vec<RunSegment> = Vec::new();
    for seg in sorted {
        let is_new = tiers
            .last()
            .map_or(true, |t| seg.elevation() - t.elevation() > rules.tier_tolerance);
        if is_new {
            tiers.push(seg.clone());
        }
    }
    if tiers.len() > rules.max_tiers {
        log::warn!(
            "rack has {} tiers, only the lowest {} are supported",
            tiers.len(),
            rules.max_tiers
        );
        tiers.truncate(rules.max_tiers);
    }
    tiers
}

/// Spacing from each tier to the one below it, for tiers `1..n`.
///
/// The governing radius of a tier is half the largest diameter among all
/// rack segments within `tolerance` of that tier's elevation. The radius is
/// reported, not subtracted.
pub fn resolve_tier_spacings(
    tiers: &[RunSegment],
    segments: &[RunSegment],
    tolerance: f64,
) -> HangerResult<Vec<TierSpacing>> {
    if tiers.len() < 2 {
        return Err(HangerError::NoSupportsProducible(format!(
            "tier spacing needs at least two tiers, rack has {}",
            tiers.len()
        )));
    }

    let spacings = tiers
        .windows(2)
        .map(|pair| {
            let below = pair[0].elevation();
            let here = pair[1].elevation();
            let diameter = segments
                .iter()
                .filter(|s| (s.elevation() - here).abs() <= tolerance)
                .filter_map(|s| s.diameter)
                .fold(0.0_f64, f64::max);
            TierSpacing {
                delta: here - below,
                radius: diameter / 2.0,
            }
        })
        .collect();
    Ok(spacings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn seg(id: u64, y: f64, z: f64, dia: f64) -> RunSegment {
        RunSegment::from_coords(id, [0.0, y, z], [20.0, y, z], dia)
    }

    #[test]
    fn test_left_and_right() {
        let rules = ClassificationRules::default();
        let segs = vec![seg(1, 0.0, 10.0, 0.1), seg(2, 1.0, 10.0, 0.1), seg(3, -1.0, 10.0, 0.1)];
        let ctx = RackPlacementContext::from_segments(&segs, &rules).unwrap();
        // left of +X is +Y
        assert_eq!(ctx.leftmost.id.0, 2);
        assert_eq!(ctx.rightmost.id.0, 3);
        assert_eq!(ctx.tiers.len(), 1);
    }

    #[test]
    fn test_tiers_deduplicated_and_sorted() {
        let rules = ClassificationRules::default();
        let tol = rules.tier_tolerance;
        let segs = vec![
            seg(1, 0.0, 12.0, 0.1),
            seg(2, 1.0, 10.0, 0.1),
            seg(3, 2.0, 10.0 + tol * 0.5, 0.1),
            seg(4, 0.0, 11.0, 0.1),
        ];
        let ctx = RackPlacementContext::from_segments(&segs, &rules).unwrap();
        let elevations: Vec<f64> = ctx.tiers.iter().map(|t| t.elevation()).collect();
        assert_eq!(elevations, vec![10.0, 11.0, 12.0]);
    }

    #[test]
    fn test_tiers_capped() {
        let rules = ClassificationRules::default();
        let segs: Vec<RunSegment> = (0..6).map(|i| seg(i, 0.0, 10.0 + i as f64, 0.1)).collect();
        let ctx = RackPlacementContext::from_segments(&segs, &rules).unwrap();
        assert_eq!(ctx.tiers.len(), 4);
        assert_relative_eq!(ctx.tiers[3].elevation(), 13.0);
    }

    #[test]
    fn test_empty_rack() {
        let rules = ClassificationRules::default();
        let err = RackPlacementContext::from_segments(&[], &rules);
        assert!(matches!(err, Err(HangerError::NoSupportsProducible(_))));
    }

    #[test]
    fn test_tier_spacing_uses_largest_diameter() {
        let segs = vec![
            seg(1, 0.0, 10.0, 0.1),
            seg(2, 0.0, 11.0, 0.2),
            seg(3, 1.0, 11.0, 0.3),
            seg(4, 0.0, 12.5, 0.1),
        ];
        let tiers = vec![segs[0].clone(), segs[1].clone(), segs[3].clone()];
        let spacings = resolve_tier_spacings(&tiers, &segs, 0.04).unwrap();
        assert_eq!(spacings.len(), 2);
        assert_relative_eq!(spacings[0].delta, 1.0);
        assert_relative_eq!(spacings[0].radius, 0.15);
        assert_relative_eq!(spacings[0].gap(), 0.85, epsilon = 1e-12);
        assert_relative_eq!(spacings[1].delta, 1.5);
        assert_relative_eq!(spacings[1].radius, 0.05);
    }

    #[test]
    fn test_tier_spacing_needs_two_tiers() {
        let segs = vec![seg(1, 0.0, 10.0, 0.1)];
        let err = resolve_tier_spacings(&segs, &segs, 0.04);
        assert!(matches!(err, Err(HangerError::NoSupportsProducible(_))));
    }
}
