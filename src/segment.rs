//! Host run inputs: conduit segments, cable-tray runs and fixture hosts

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geometry::{Line, Point3};

/// Identifier of an element in the host document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ElementId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// One straight piece of conduit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSegment {
    /// Host element id
    pub id: ElementId,
    /// Centerline
    pub line: Line,
    /// Outside diameter, `None` when the host model has no value
    #[serde(default)]
    pub diameter: Option<f64>,
}

impl RunSegment {
    /// Create a new segment
    pub fn new(id: impl Into<ElementId>, line: Line, diameter: Option<f64>) -> Self {
        Self {
            id: id.into(),
            line,
            diameter,
        }
    }

    /// Create a segment from raw endpoint coordinates and a diameter
    pub fn from_coords(id: u64, start: [f64; 3], end: [f64; 3], diameter: f64) -> Self {
        Self::new(id, Line::from_coords(start, end), Some(diameter))
    }

    pub fn length(&self) -> f64 {
        self.line.length()
    }

    pub fn elevation(&self) -> f64 {
        self.line.elevation()
    }

    /// Half the diameter, zero when the diameter is unknown
    pub fn radius(&self) -> f64 {
        self.diameter.unwrap_or(0.0) / 2.0
    }
}

/// A straight cable-tray run described by its two bounding edges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrayRun {
    pub id: ElementId,
    /// Edge along which supports are laid out
    pub edge: Line,
    /// Opposite bounding edge of the tray
    pub opposite_edge: Line,
}

impl TrayRun {
    pub fn new(id: impl Into<ElementId>, edge: Line, opposite_edge: Line) -> Self {
        Self {
            id: id.into(),
            edge,
            opposite_edge,
        }
    }

    /// Build a tray from its centerline and width; the edges sit at half the
    /// width either side of the centerline
    pub fn from_centerline(id: impl Into<ElementId>, centerline: Line, width: f64) -> Option<Self> {
        let normal = centerline.left_normal()? * (width / 2.0);
        let edge = Line::new(centerline.start + normal, centerline.end + normal);
        let opposite = Line::new(centerline.start - normal, centerline.end - normal);
        Some(Self::new(id, edge, opposite))
    }

    pub fn length(&self) -> f64 {
        self.edge.length()
    }
}

/// A point-located host object such as a junction box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureHost {
    pub id: ElementId,
    pub location: Point3,
}

impl FixtureHost {
    pub fn new(id: impl Into<ElementId>, location: Point3) -> Self {
        Self {
            id: id.into(),
            location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_segment_radius_defaults_to_zero() {
        let seg = RunSegment::new(1, Line::from_coords([0.0; 3], [5.0, 0.0, 0.0]), None);
        assert_eq!(seg.radius(), 0.0);
        assert_relative_eq!(seg.length(), 5.0);
    }

    #[test]
    fn test_tray_from_centerline() {
        let center = Line::from_coords([0.0, 0.0, 10.0], [20.0, 0.0, 10.0]);
        let tray = TrayRun::from_centerline(7, center, 2.0).unwrap();
        assert_relative_eq!(tray.edge.start.y, 1.0);
        assert_relative_eq!(tray.opposite_edge.start.y, -1.0);
        assert_relative_eq!(tray.length(), 20.0);
    }
}
