//! Headless гонка Midnight Grind: 6 AI водителей на овале
//!
//! `midnight_ai [seed]` - одинаковый seed даёт одинаковую гонку.

use std::sync::Arc;

use midnight_ai::{
    create_headless_app, oval_centerline, spawn_grid, DriverProfile, GridEntry, Personality, RaceSignal, RaceStatus,
    RaceTrack, RacingLineBuilder, SimulationPlugin, TrackProgress, Vehicle,
};

const LAPS: u32 = 3;
/// 10 минут симуляции при 60Hz - гонка точно успеет закончиться
const MAX_TICKS: usize = 60 * 60 * 10;

fn main() {
    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(42);
    println!("Starting Midnight Grind headless race (seed: {}, laps: {})", seed, LAPS);

    let line = match RacingLineBuilder::default().build(&oval_centerline(400.0, 60.0, 5.0)) {
        Ok(line) => Arc::new(line),
        Err(error) => {
            eprintln!("Failed to build racing line: {}", error);
            return;
        }
    };
    println!(
        "Track: oval {:.0} m, {} points",
        line.total_length(),
        line.len()
    );

    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin)
        .insert_resource(RaceTrack::new(Arc::clone(&line), LAPS));

    let entries = vec![
        GridEntry::ai("Razor", Some(DriverProfile::preset("Razor", Personality::Aggressive))),
        GridEntry::ai("Wall", Some(DriverProfile::preset("Wall", Personality::Defensive))),
        GridEntry::ai("Prof", Some(DriverProfile::preset("Prof", Personality::Calculated))),
        GridEntry::ai("Joker", Some(DriverProfile::preset("Joker", Personality::Unpredictable))),
        GridEntry::ai("Kid", Some(DriverProfile::preset("Kid", Personality::Rookie))).with_difficulty(0.8),
        GridEntry::ai("Ghost", None),
    ];
    let grid = spawn_grid(&mut app.world_mut().commands(), &line, &entries);
    println!("Grid: {} cars", grid.len());

    app.world_mut().send_event(RaceSignal::Start);

    for tick in 0..MAX_TICKS {
        app.update();

        let status = app.world().resource::<RaceStatus>();
        if status.is_finished() {
            println!("Race finished at tick {} ({:.1}s)", tick, status.elapsed);
            break;
        }

        if tick > 0 && tick % 600 == 0 {
            println!("Tick {}: {:.0}s elapsed", tick, status.elapsed);
        }
    }

    println!("\nResults:");
    let world = app.world();
    let status = world.resource::<RaceStatus>();

    // Финишировавшие по порядку, остальные - по дистанции
    let mut unfinished: Vec<_> = grid
        .iter()
        .map(|slot| slot.vehicle)
        .filter(|vehicle| !status.finish_order.contains(vehicle))
        .collect();
    unfinished.sort_by(|a, b| {
        let distance = |entity| world.get::<TrackProgress>(entity).map_or(0.0, |p| p.race_distance);
        distance(*b).total_cmp(&distance(*a))
    });

    for (position, vehicle) in status.finish_order.iter().chain(unfinished.iter()).enumerate() {
        let name = world.get::<Vehicle>(*vehicle).map_or("?", |v| v.name.as_str());
        let laps = world.get::<TrackProgress>(*vehicle).map_or(0, |p| p.laps_completed);
        let finished = if status.finish_order.contains(vehicle) { "" } else { " (DNF)" };
        println!("  P{} {:<6} laps {}{}", position + 1, name, laps, finished);
    }
}
