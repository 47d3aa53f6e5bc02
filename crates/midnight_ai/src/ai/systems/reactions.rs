//! AI reaction systems: контакты, вылеты, опасности на трассе.
//!
//! Все события адресованы машине (Entity), контроллер находим по pawn.

use bevy::prelude::*;

use crate::ai::controller::{CollisionReport, RacerController};
use crate::ai::events::{TrackHazard, VehicleOffTrack};
use crate::components::PlayerControlled;
use crate::physics::VehicleCollision;

/// System: VehicleCollision → notify_collision контроллера пострадавшей машины
pub fn react_to_collisions(
    mut collisions: EventReader<VehicleCollision>,
    mut controllers: Query<&mut RacerController>,
    transforms: Query<&Transform>,
    players: Query<(), With<PlayerControlled>>,
) {
    for collision in collisions.read() {
        let Some(mut controller) = controllers
            .iter_mut()
            .find(|controller| controller.pawn() == Some(collision.vehicle))
        else {
            continue;
        };

        let my_position = transforms
            .get(collision.vehicle)
            .map_or(collision.impact_point, |t| t.translation);
        let other_position = transforms
            .get(collision.other)
            .map_or(collision.impact_point, |t| t.translation);

        controller.notify_collision(&CollisionReport {
            other: collision.other,
            other_is_player: players.contains(collision.other),
            my_position,
            my_velocity: collision.velocity,
            other_position,
            other_velocity: collision.other_velocity,
            impact_normal: collision.impact_normal,
        });
    }
}

/// System: VehicleOffTrack → notify_off_track
pub fn react_to_off_track(
    mut off_track: EventReader<VehicleOffTrack>,
    mut controllers: Query<&mut RacerController>,
) {
    for event in off_track.read() {
        for mut controller in controllers.iter_mut() {
            if controller.pawn() == Some(event.vehicle) {
                controller.notify_off_track();
            }
        }
    }
}

/// System: TrackHazard → Caution для всех, чья машина внутри радиуса
pub fn react_to_hazards(
    mut hazards: EventReader<TrackHazard>,
    mut controllers: Query<&mut RacerController>,
    transforms: Query<&Transform>,
) {
    for hazard in hazards.read() {
        for mut controller in controllers.iter_mut() {
            let Some(position) = controller
                .pawn()
                .and_then(|pawn| transforms.get(pawn).ok())
                .map(|t| t.translation)
            else {
                continue;
            };

            if position.distance(hazard.position) <= hazard.radius {
                crate::log(&format!(
                    "⚠️ Hazard at {:?} (r={:.0}) → caution for {:?}",
                    hazard.position,
                    hazard.radius,
                    controller.pawn()
                ));
                controller.notify_hazard(hazard.duration);
            }
        }
    }
}
