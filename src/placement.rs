//! Placement point generation along a straight run

use crate::geometry::{Line, Point3};

const RATIO_TOLERANCE: f64 = 1e-9;

/// Distances from the start of a run at which supports land.
///
/// * runs no longer than `nominal` get one support at the midpoint
/// * runs shorter than `nominal + 2 * bend` get a support `bend` from each
///   end, plus a midpoint support when the interior is itself at least
///   `nominal` long
/// * longer runs get supports `bend` from each end and the interior split
///   into equal spans no longer than `nominal`
///
/// Every distance lies in `[0, length]` and the result is sorted.
pub fn placement_distances(nominal: f64, bend: f64, length: f64) -> Vec<f64> {
    if !(nominal > 0.0) || !(length >= 0.0) || !length.is_finite() {
        return Vec::new();
    }
    let bend = bend.max(0.0);

    let mut distances = if length <= nominal {
        vec![length / 2.0]
    } else if length < nominal + 2.0 * bend {
        let mut d = vec![bend, length - bend];
        if length - 2.0 * bend >= nominal {
            d.push(length / 2.0);
        }
        d
    } else {
        let interior = length - 2.0 * bend;
        let spans = ((interior / nominal) - RATIO_TOLERANCE).ceil().max(1.0);
        let spacing = interior / spans;
        let last = length - bend;

        let mut d = vec![bend];
        let mut i = 1.0;
        while bend + i * spacing < last - spacing * RATIO_TOLERANCE {
            d.push(bend + i * spacing);
            i += 1.0;
        }
        d.push(last);
        d
    };

    for d in distances.iter_mut() {
        *d = d.clamp(0.0, length);
    }
    distances.sort_by(f64::total_cmp);
    distances
}

/// World-space support points along `line`
pub fn placement_points(line: &Line, nominal: f64, bend: f64) -> Vec<Point3> {
    placement_distances(nominal, bend, line.length())
        .into_iter()
        .map(|d| line.point_at(d))
        .collect()
}
