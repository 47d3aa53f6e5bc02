//! Race standings: позиции и gap'ы (в секундах) для каждого контроллера.

use bevy::prelude::*;

use crate::ai::controller::{RaceStanding, RacerController};
use crate::components::{TrackProgress, Vehicle, VehicleBody};

/// Нижняя граница скорости для перевода дистанции в секунды (старт, развороты)
pub const MIN_GAP_SPEED: f32 = 10.0;

/// Участник для расчёта standings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandingEntry {
    pub vehicle: Entity,
    pub race_distance: f32,
    pub speed: f32,
}

/// Позиции по пройденной дистанции (при равенстве - по Entity)
///
/// Gap = разница дистанций / скорость догоняющего (не меньше MIN_GAP_SPEED).
pub fn compute_standings(entries: &[StandingEntry]) -> Vec<(Entity, RaceStanding)> {
    let mut order: Vec<StandingEntry> = entries.to_vec();
    order.sort_by(|a, b| {
        b.race_distance
            .total_cmp(&a.race_distance)
            .then(a.vehicle.cmp(&b.vehicle))
    });

    let total = order.len() as u32;
    let gap = |front: &StandingEntry, back: &StandingEntry| {
        ((front.race_distance - back.race_distance) / back.speed.max(MIN_GAP_SPEED)).max(0.0)
    };

    order
        .iter()
        .enumerate()
        .map(|(rank, entry)| {
            let standing = RaceStanding {
                position: rank as u32 + 1,
                total,
                gap_to_leader: gap(&order[0], entry),
                gap_to_ahead: rank.checked_sub(1).map(|ahead| gap(&order[ahead], entry)),
                gap_to_behind: order.get(rank + 1).map(|behind| gap(entry, behind)),
            };
            (entry.vehicle, standing)
        })
        .collect()
}

/// Система: standings → update_race_position контроллеров (по pawn)
pub fn update_race_standings(
    vehicles: Query<(Entity, &TrackProgress, &VehicleBody), With<Vehicle>>,
    mut controllers: Query<&mut RacerController>,
) {
    let entries: Vec<StandingEntry> = vehicles
        .iter()
        .map(|(vehicle, progress, body)| StandingEntry {
            vehicle,
            race_distance: progress.race_distance,
            speed: body.velocity.length(),
        })
        .collect();

    if entries.is_empty() {
        return;
    }

    let standings = compute_standings(&entries);

    for mut controller in controllers.iter_mut() {
        let Some(pawn) = controller.pawn() else {
            continue;
        };
        if let Some((_, standing)) = standings.iter().find(|(vehicle, _)| *vehicle == pawn) {
            controller.update_race_position(*standing);
        }
    }
}
