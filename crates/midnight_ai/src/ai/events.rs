//! AI Events - входящие сигналы гонки и исходящие решения контроллера
//!
//! Входящие: VehicleOffTrack (race director), TrackHazard (маршалы/погода).
//! VehicleCollision живёт в physics - его пишет contact detection.
//! Исходящие: копируются из outbox контроллера системой emit_racer_events.

use bevy::prelude::*;

use super::components::{DrivingState, OvertakeStrategy};

/// Машина ушла за пределы трассы (дальше половины ширины + запас)
#[derive(Event, Debug, Clone, Copy)]
pub struct VehicleOffTrack {
    pub vehicle: Entity,
}

/// Опасность на трассе (авария, обломки, дождь стеной)
#[derive(Event, Debug, Clone, Copy)]
pub struct TrackHazard {
    pub position: Vec3,
    /// Радиус действия (метры)
    pub radius: f32,
    /// Сколько держать Caution (секунды)
    pub duration: f32,
}

/// Переход driving state machine
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrivingStateChanged {
    /// Entity контроллера
    pub controller: Entity,
    /// Машина, которой он управлял (если есть)
    pub vehicle: Option<Entity>,
    pub from: DrivingState,
    pub to: DrivingState,
}

/// Обгон завершён: цель больше не впереди
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct OvertakeCompleted {
    pub controller: Entity,
    pub vehicle: Option<Entity>,
    pub overtaken: Entity,
    pub strategy: OvertakeStrategy,
}

/// Атакующий прошёл нас во время защиты
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WasOvertaken {
    pub controller: Entity,
    pub vehicle: Option<Entity>,
    pub by: Entity,
}
