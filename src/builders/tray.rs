//! Strut supports under a cable tray

use crate::error::HangerResult;
use crate::geometry::Line;
use crate::placement::placement_points;
use crate::segment::TrayRun;
use crate::spatial::SpatialQuery;
use crate::supports::SupportRecord;

use super::strut::{assemble_strut, StrutInput};
use super::{BuildContext, PlacementOutcome};

/// Place strut supports along a tray. Each strut runs from the placement
/// point on the tray edge to its projection on the opposite edge. Trays
/// get no conduit straps.
pub fn build_tray_supports<Q: SpatialQuery + ?Sized>(
    ctx: &BuildContext<'_, Q>,
    tray: &TrayRun,
    outcome: &mut PlacementOutcome,
) -> HangerResult<()> {
    let clearance = ctx.rules.max_rod_diameter + ctx.options.inside_rod_gap;
    let exclude = [tray.id];

    for point in placement_points(
        &tray.edge,
        ctx.options.nominal_spacing,
        ctx.options.bend_spacing,
    ) {
        let opposite = tray.opposite_edge.project(&point);
        let raw = Line::new(point, opposite).at_elevation(point.z);

        if let Some(strut) = assemble_strut(
            ctx,
            StrutInput {
                host: tray.id,
                origin: point,
                raw,
                extend_start: clearance,
                extend_end: clearance,
                straps: Vec::new(),
                tier_spacings: Vec::new(),
                exclude: &exclude,
            },
            outcome,
        )? {
            outcome.supports.push(SupportRecord::Strut(strut));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::AnchorType;
    use crate::options::SupportOptions;
    use crate::rules::ClassificationRules;
    use crate::spatial::{Category, Obstruction, Scene};
    use approx::assert_relative_eq;

    #[test]
    fn test_tray_struts_span_width() {
        let scene = Scene::new().with_obstruction(Obstruction::slab(
            5,
            Category::Joist,
            [-10.0, 40.0],
            [-10.0, 10.0],
            12.0,
            1.0,
        ));
        let options = SupportOptions::default().with_spacing(8.0, 2.0);
        let rules = ClassificationRules::default();
        let ctx = BuildContext::new(&options, &rules, &scene);
        let center = Line::from_coords([0.0, 0.0, 9.0], [20.0, 0.0, 9.0]);
        let tray = TrayRun::from_centerline(40, center, 2.0).unwrap();

        let mut outcome = PlacementOutcome::new();
        build_tray_supports(&ctx, &tray, &mut outcome).unwrap();
        assert_eq!(outcome.supports.len(), 3);

        let clearance = rules.max_rod_diameter + options.inside_rod_gap;
        for record in &outcome.supports {
            let SupportRecord::Strut(strut) = record else {
                panic!("expected strut");
            };
            assert!(strut.straps.is_empty());
            assert!(strut.tier_spacings.is_empty());
            assert_relative_eq!(strut.strut_line.length(), 2.0 + 2.0 * clearance, epsilon = 1e-9);
            assert_eq!(strut.anchor_types, [AnchorType::BeamClamp; 2]);
            assert_relative_eq!(strut.rod_lengths[1], 3.0);
        }
    }

    #[test]
    fn test_tray_with_collapsed_edges() {
        let scene = Scene::new();
        let options = SupportOptions::default();
        let rules = ClassificationRules::default();
        let ctx = BuildContext::new(&options, &rules, &scene);
        let edge = Line::from_coords([0.0, 0.0, 9.0], [6.0, 0.0, 9.0]);
        let tray = TrayRun::new(41, edge, edge);

        let mut outcome = PlacementOutcome::new();
        build_tray_supports(&ctx, &tray, &mut outcome).unwrap();
        assert!(outcome.supports.is_empty());
        assert_eq!(outcome.skipped_points(), 1);
    }
}
