//! Single-rod supports above point fixtures

use crate::error::HangerResult;
use crate::segment::FixtureHost;
use crate::spatial::SpatialQuery;
use crate::supports::{FixtureSupport, SupportRecord};

use super::BuildContext;

/// Build the support for one fixture. The rule's fixture extra rod is added
/// to the collision distance before minimum rod length pruning.
pub fn build_fixture_support<Q: SpatialQuery + ?Sized>(
    ctx: &BuildContext<'_, Q>,
    host: &FixtureHost,
) -> HangerResult<SupportRecord> {
    let detail = ctx.classifier().resolve(
        ctx.query,
        host.location,
        ctx.rules.fixture_extra_rod,
        &[host.id],
    )?;
    Ok(SupportRecord::Fixture(FixtureSupport {
        origin: host.location,
        rod_length: detail.rod_length,
        rod_diameter: ctx.options.rod_diameter,
        coupling_count: detail.coupling_count,
        anchor_type: detail.anchor_type,
        host: host.id,
        linked_placement: None,
    }))
}
