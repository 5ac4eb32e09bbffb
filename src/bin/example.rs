//! Hanger Engine Example - two-tier conduit rack under a slab and a beam
//!
//! Pass a JSON options file as the first argument to override the defaults.

use anyhow::Context;
use hanger_engine::prelude::*;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    println!("=== Hanger Engine Example: Two-Tier Rack ===\n");

    let options = match std::env::args().nth(1) {
        Some(path) => SupportOptions::from_json_file(&path)
            .with_context(|| format!("failed to load options from {path}"))?,
        None => SupportOptions::default(),
    };

    // Concrete deck at 14' with a steel beam under it along X = 12'..13'
    //
    //   ======================== slab (14')
    //              [beam]        (12.5')
    //   ---- tier 2 ----         (10.5')
    //   ---- tier 1 ----         (10')
    let scene = Scene::new()
        .with_obstruction(Obstruction::slab(
            900,
            Category::Floor,
            [-20.0, 60.0],
            [-20.0, 20.0],
            14.0,
            0.5,
        ))
        .with_obstruction(Obstruction::slab(
            901,
            Category::StructuralFraming,
            [12.0, 13.0],
            [-20.0, 20.0],
            12.5,
            1.5,
        ));

    let units = FeetInches::default();
    let size = |label: &str| {
        units
            .parse(label)
            .with_context(|| format!("bad trade size {label}"))
    };

    let rack = vec![
        RunSegment::from_coords(1, [0.0, 0.0, 10.0], [40.0, 0.0, 10.0], size("2\"")?),
        RunSegment::from_coords(2, [0.0, 0.5, 10.0], [40.0, 0.5, 10.0], size("1\"")?),
        RunSegment::from_coords(3, [0.0, 1.0, 10.0], [40.0, 1.0, 10.0], size("1\"")?),
        RunSegment::from_coords(4, [0.0, 0.25, 10.5], [40.0, 0.25, 10.5], size("3/4\"")?),
        RunSegment::from_coords(5, [0.0, 0.75, 10.5], [40.0, 0.75, 10.5], size("3/4\"")?),
    ];
    let branch = RunSegment::from_coords(10, [5.0, 8.0, 11.0], [5.0, 30.0, 11.0], size("1/2\"")?);
    let fixtures = [
        FixtureHost::new(20, Point3::new(30.0, 6.0, 9.0)),
        FixtureHost::new(21, Point3::new(34.0, 6.0, 9.0)),
    ];

    let engine = SupportEngine::new(options, &scene)?;

    let rack_outcome = engine.place_rack(&rack)?;
    let branch_outcome = engine.place_single(&[branch])?;
    let fixture_outcome = engine.place_fixtures(&fixtures)?;

    println!("Rack supports:");
    for support in &rack_outcome.supports {
        if let SupportRecord::Strut(strut) = support {
            let anchors: Vec<&str> = strut.anchor_types.iter().map(|a| a.name()).collect();
            println!(
                "  at x = {:>6}: strut {}, rods {} / {}, anchors {:?}, straps {}",
                units.format(strut.origin.x),
                units.format(strut.strut_length),
                units.format(strut.rod_lengths[0]),
                units.format(strut.rod_lengths[1]),
                anchors,
                strut.strap_count()
            );
        }
    }
    if let Some(SupportRecord::Strut(first)) = rack_outcome.supports.first() {
        for (i, offset) in first.tier_offsets().iter().enumerate() {
            println!("  tier {} offset: {}", i + 2, units.format(*offset));
        }
    }

    println!("\nBranch supports: {}", branch_outcome.supports.len());
    println!("Fixture supports: {}", fixture_outcome.supports.len());

    let outcomes = [&rack_outcome, &branch_outcome, &fixture_outcome];
    for diagnostic in outcomes.iter().flat_map(|o| &o.diagnostics) {
        println!(
            "  diagnostic on {}: {}",
            diagnostic.host,
            diagnostic.kind.describe(&units)
        );
    }

    println!("\nHardware:");
    let bom = engine.hardware_total(outcomes, &HardwareKit::default());
    for item in bom.line_items() {
        let size = item
            .key
            .size
            .as_deref()
            .or(item.key.diameter.as_deref())
            .unwrap_or("");
        if item.key.category.sums_length() {
            println!(
                "  {:<20} {:>8} x{:<4} {}",
                item.key.type_name,
                size,
                item.count,
                units.format(item.length)
            );
        } else {
            println!("  {:<20} {:>8} x{}", item.key.type_name, size, item.count);
        }
    }

    Ok(())
}
