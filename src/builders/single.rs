//! Single-rod supports along one conduit run

use crate::anchor::attachment_for_diameter;
use crate::error::HangerResult;
use crate::placement::placement_points;
use crate::segment::RunSegment;
use crate::spatial::SpatialQuery;
use crate::supports::{SingleSupport, SupportRecord};

use super::{BuildContext, Diagnostic, DiagnosticKind, PlacementOutcome};

/// Place single supports along `segment`, appending them to `outcome`
pub fn build_single_supports<Q: SpatialQuery + ?Sized>(
    ctx: &BuildContext<'_, Q>,
    segment: &RunSegment,
    outcome: &mut PlacementOutcome,
) -> HangerResult<()> {
    if segment.line.is_degenerate(ctx.rules.min_curve_length) {
        outcome.record(
            Diagnostic::new(
                segment.id,
                Some(segment.line.start),
                DiagnosticKind::DegenerateRun {
                    length: segment.length(),
                },
            ),
            &ctx.rules.units,
        );
        return Ok(());
    }

    let classifier = ctx.classifier();
    let attachment = attachment_for_diameter(ctx.options.attachment, segment.diameter, ctx.rules);
    let attachment_size = ctx.rules.size_label(segment.diameter);

    for point in placement_points(
        &segment.line,
        ctx.options.nominal_spacing,
        ctx.options.bend_spacing,
    ) {
        let detail = classifier.resolve(ctx.query, point, 0.0, &[segment.id])?;
        outcome.supports.push(SupportRecord::Single(SingleSupport {
            origin: point,
            rod_length: detail.rod_length,
            rod_diameter: ctx.options.rod_diameter,
            coupling_count: detail.coupling_count,
            attachment,
            attachment_size: attachment_size.clone(),
            anchor_type: detail.anchor_type,
            host: segment.id,
            linked_placement: None,
        }));
    }
    Ok(())
}
