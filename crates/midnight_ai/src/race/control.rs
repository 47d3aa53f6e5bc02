//! Старт / стоп гонки и финиш машин.

use bevy::prelude::*;

use super::{RaceSignal, RaceStatus, RaceTrack};
use crate::ai::controller::RacerController;
use crate::components::{TrackProgress, Vehicle};

/// Система: RaceSignal → start_racing / stop_racing для всех контроллеров
pub fn handle_race_signals(
    mut signals: EventReader<RaceSignal>,
    mut status: ResMut<RaceStatus>,
    mut controllers: Query<&mut RacerController>,
) {
    for signal in signals.read() {
        match signal {
            RaceSignal::Start => {
                status.running = true;
                status.elapsed = 0.0;
                status.finish_order.clear();
                for mut controller in controllers.iter_mut() {
                    controller.start_racing();
                }
                crate::log_info(&format!("🚦 Race started ({} AI drivers)", controllers.iter().count()));
            }
            RaceSignal::Stop => {
                status.running = false;
                for mut controller in controllers.iter_mut() {
                    controller.stop_racing();
                }
                crate::log_info(&format!("🛑 Race stopped at {:.1}s", status.elapsed));
            }
        }
    }
}

/// Система: часы гонки + финиш после `RaceTrack::laps` кругов
///
/// Финишировавший AI переходит в Finished. Когда финишировали все - гонка окончена.
pub fn check_finishers(
    track: Option<Res<RaceTrack>>,
    mut status: ResMut<RaceStatus>,
    time: Res<Time<Fixed>>,
    vehicles: Query<(Entity, &Vehicle, &TrackProgress)>,
    mut controllers: Query<&mut RacerController>,
) {
    let Some(track) = track else {
        return;
    };
    if !status.running {
        return;
    }

    status.elapsed += time.delta_secs();

    let mut finished: Vec<(Entity, f32)> = vehicles
        .iter()
        .filter(|(entity, _, progress)| {
            progress.laps_completed >= track.laps && !status.finish_order.contains(entity)
        })
        .map(|(entity, _, progress)| (entity, progress.race_distance))
        .collect();
    // Финиш в одном tick'е: кто дальше проехал - тот раньше
    finished.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    for (entity, _) in finished {
        status.finish_order.push(entity);
        let name = vehicles.get(entity).map_or("?", |(_, vehicle, _)| vehicle.name.as_str());
        crate::log_info(&format!(
            "🏆 {} finished P{} ({:.1}s)",
            name,
            status.finish_order.len(),
            status.elapsed
        ));

        for mut controller in controllers.iter_mut() {
            if controller.pawn() == Some(entity) {
                controller.stop_racing();
            }
        }
    }

    let total = vehicles.iter().count();
    if total > 0 && status.finish_order.len() >= total {
        status.running = false;
        crate::log_info(&format!("🏁 All {} cars finished in {:.1}s", total, status.elapsed));
    }
}
