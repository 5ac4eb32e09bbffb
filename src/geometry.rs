//! Geometry primitives: points, straight lines and the small amount of
//! vector math the placement builders need.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

pub type Point3 = nalgebra::Point3<f64>;
pub type Vec3 = Vector3<f64>;

/// Tolerance used for degenerate length and direction checks
pub const EPSILON: f64 = 1e-9;

/// Global up direction
pub fn up() -> Vec3 {
    Vec3::z()
}

/// Distance between two points
pub fn distance(a: &Point3, b: &Point3) -> f64 {
    (b - a).norm()
}

/// A straight line between two points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub start: Point3,
    pub end: Point3,
}

impl Line {
    /// Create a new line
    pub fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    /// Create a line from raw coordinates
    pub fn from_coords(start: [f64; 3], end: [f64; 3]) -> Self {
        Self::new(
            Point3::new(start[0], start[1], start[2]),
            Point3::new(end[0], end[1], end[2]),
        )
    }

    pub fn length(&self) -> f64 {
        distance(&self.start, &self.end)
    }

    /// Check if the line is shorter than `tolerance`
    pub fn is_degenerate(&self, tolerance: f64) -> bool {
        self.length() < tolerance.max(EPSILON)
    }

    /// Unit direction from start to end, `None` for a zero-length line
    pub fn direction(&self) -> Option<Vec3> {
        let v = self.end - self.start;
        let len = v.norm();
        if len < EPSILON {
            None
        } else {
            Some(v / len)
        }
    }

    pub fn midpoint(&self) -> Point3 {
        nalgebra::center(&self.start, &self.end)
    }

    /// Elevation of the line, taken at its midpoint
    pub fn elevation(&self) -> f64 {
        self.midpoint().z
    }

    /// Point at a distance from the start, by linear interpolation.
    ///
    /// Distances are not clamped; callers keep them in `[0, length]`.
    pub fn point_at(&self, distance: f64) -> Point3 {
        let len = self.length();
        if len < EPSILON {
            return self.start;
        }
        self.start + (self.end - self.start) * (distance / len)
    }

    /// Signed distance from the start of the foot of `point` on the
    /// unbounded line
    pub fn parameter_of(&self, point: &Point3) -> f64 {
        match self.direction() {
            Some(dir) => (point - self.start).dot(&dir),
            None => 0.0,
        }
    }

    /// Project `point` onto the unbounded line through this segment
    pub fn project(&self, point: &Point3) -> Point3 {
        match self.direction() {
            Some(dir) => self.start + dir * (point - self.start).dot(&dir),
            None => self.start,
        }
    }

    /// Check whether the projection of `point` falls within the segment,
    /// allowing `tolerance` past either end
    pub fn spans(&self, point: &Point3, tolerance: f64) -> bool {
        let t = self.parameter_of(point);
        t >= -tolerance && t <= self.length() + tolerance
    }

    /// Lengthen the line by `start_by` before the start and `end_by` past
    /// the end. Zero-length lines are returned unchanged.
    pub fn extended(&self, start_by: f64, end_by: f64) -> Self {
        match self.direction() {
            Some(dir) => Self::new(self.start - dir * start_by, self.end + dir * end_by),
            None => *self,
        }
    }

    /// Same line with both endpoints moved to elevation `z`
    pub fn at_elevation(&self, z: f64) -> Self {
        Self::new(
            Point3::new(self.start.x, self.start.y, z),
            Point3::new(self.end.x, self.end.y, z),
        )
    }

    /// Horizontal unit vector pointing to the left of the line direction.
    ///
    /// Returns `None` for vertical or zero-length lines.
    pub fn left_normal(&self) -> Option<Vec3> {
        let dir = self.direction()?;
        let n = up().cross(&dir);
        let len = n.norm();
        if len < EPSILON {
            None
        } else {
            Some(n / len)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_point_at_interpolates() {
        let line = Line::from_coords([0.0, 0.0, 0.0], [10.0, 0.0, 0.0]);
        let p = line.point_at(2.5);
        assert_relative_eq!(p.x, 2.5);
        assert_relative_eq!(line.midpoint().x, 5.0);
    }

    #[test]
    fn test_project_onto_unbounded_line() {
        let line = Line::from_coords([0.0, 2.0, 1.0], [10.0, 2.0, 1.0]);
        let p = line.project(&Point3::new(14.0, -3.0, 7.0));
        assert_relative_eq!(p.x, 14.0);
        assert_relative_eq!(p.y, 2.0);
        assert_relative_eq!(p.z, 1.0);
        assert!(!line.spans(&Point3::new(14.0, 0.0, 0.0), 0.1));
        assert!(line.spans(&Point3::new(4.0, 0.0, 0.0), 0.0));
    }

    #[test]
    fn test_extended_per_end() {
        let line = Line::from_coords([0.0, 0.0, 0.0], [0.0, 4.0, 0.0]);
        let ext = line.extended(1.0, 0.5);
        assert_relative_eq!(ext.start.y, -1.0);
        assert_relative_eq!(ext.end.y, 4.5);
        assert_relative_eq!(ext.length(), 5.5);
    }

    #[test]
    fn test_left_normal() {
        let line = Line::from_coords([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        let n = line.left_normal().unwrap();
        assert_relative_eq!(n.y, 1.0);

        let vertical = Line::from_coords([0.0, 0.0, 0.0], [0.0, 0.0, 3.0]);
        assert!(vertical.left_normal().is_none());
    }

    #[test]
    fn test_degenerate_line() {
        let line = Line::from_coords([1.0, 1.0, 1.0], [1.0, 1.0, 1.0]);
        assert!(line.direction().is_none());
        assert!(line.is_degenerate(0.001));
        assert_eq!(line.point_at(3.0), line.start);
    }
}
