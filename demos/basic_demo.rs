//! Basic demo: build a seeded world, walk the player around, and print
//! colony state as the simulation runs.
//!
//! Run with: cargo run --example basic_demo

use colony_sim::{RunOutcome, SimConfig, SimWorld};

fn main() {
    let config = SimConfig {
        rng_seed: Some(42),
        ..SimConfig::default()
    };
    let mut sim = SimWorld::with_config(config);

    let tiles = sim.tile_snapshot();
    let open = tiles.passable.iter().filter(|p| **p).count();
    println!(
        "World: {}x{} tiles, {} open",
        tiles.width, tiles.height, open
    );

    // Dig straight down for a while, then head right.
    sim.set_input(0.0, 1.0);

    for frame in 0..1800 {
        if frame == 600 {
            sim.set_input(1.0, 0.0);
        }
        sim.step(1.0 / 60.0);

        if frame % 300 == 0 {
            let snapshot = sim.snapshot();
            let player = snapshot.ants.iter().find(|a| a.is_player);
            println!("--- tick {} ({:.1}s) ---", snapshot.tick, snapshot.time);
            if let Some(p) = player {
                println!(
                    "  player at ({:.1}, {:.1}), hp {:.0}/{:.0}, carrying {:.0}",
                    p.x, p.y, p.health, p.max_health, p.carrying
                );
            }
            for colony in &snapshot.colonies {
                println!(
                    "  colony {}: food {:.0}, workers {}, queen {}",
                    colony.id,
                    colony.food,
                    colony.worker_count,
                    if colony.has_queen { "alive" } else { "lost" }
                );
            }
            println!("  food sources remaining: {}", snapshot.food.len());
        }

        if sim.outcome() != RunOutcome::Running {
            println!("Run over: {:?}", sim.outcome());
            break;
        }
    }

    match sim.snapshot_json() {
        Ok(json) => println!("Final snapshot: {} bytes of JSON", json.len()),
        Err(e) => eprintln!("snapshot failed: {e}"),
    }
}
