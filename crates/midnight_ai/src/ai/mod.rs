//! AI racer module
//!
//! RacerController (state machine + steering) живёт в controller,
//! ECS обвязка (tick, реакции, события) - в systems.

use bevy::prelude::*;

use crate::physics::VehicleCollision;
use crate::RaceSet;

pub mod components;
pub mod controller;
pub mod events;
pub mod systems;

// Re-export основных типов
pub use components::*;
pub use controller::{
    CollisionReport, RaceStanding, RacerController, RacerEvent, TacticalData, MAX_DIFFICULTY,
    MIN_DIFFICULTY, RECOVERY_IMPACT_SPEED,
};
pub use events::*;

/// AI Plugin
///
/// Порядок выполнения (FixedUpdate):
/// 1. RaceSet::Decision - tick_racer_controllers (снимок машин → VehicleInput)
/// 2. RaceSet::Physics - интеграция, контакты (VehiclePhysicsPlugin)
/// 3. RaceSet::Reactions - контакты / вылеты / опасности → контроллеры,
///    затем outbox → DrivingStateChanged / OvertakeCompleted / WasOvertaken
pub struct RacerAIPlugin;

impl Plugin for RacerAIPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<VehicleCollision>()
            .add_event::<VehicleOffTrack>()
            .add_event::<TrackHazard>()
            .add_event::<DrivingStateChanged>()
            .add_event::<OvertakeCompleted>()
            .add_event::<WasOvertaken>()
            .add_systems(
                FixedUpdate,
                systems::tick_racer_controllers.in_set(RaceSet::Decision),
            )
            .add_systems(
                FixedUpdate,
                (
                    systems::react_to_collisions,
                    systems::react_to_off_track,
                    systems::react_to_hazards,
                    systems::emit_racer_events,
                )
                    .chain() // Последовательное выполнение для детерминизма
                    .in_set(RaceSet::Reactions),
            );
    }
}
