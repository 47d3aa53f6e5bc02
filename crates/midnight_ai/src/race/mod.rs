//! Race director - минимальная обвязка гонки вокруг AI
//!
//! - RaceSignal (Start/Stop) → start_racing / stop_racing контроллеров
//! - TrackProgress каждой машины + VehicleOffTrack
//! - Standings (позиция, gap'ы) → update_race_position
//! - Финиш после N кругов

use std::sync::Arc;

use bevy::prelude::*;

use crate::ai::events::VehicleOffTrack;
use crate::track::RacingLine;
use crate::RaceSet;

pub mod control;
pub mod grid;
pub mod progress;
pub mod standings;

#[cfg(test)]
mod grid_tests;
#[cfg(test)]
mod progress_tests;
#[cfg(test)]
mod standings_tests;

pub use control::{check_finishers, handle_race_signals};
pub use grid::{grid_transform, spawn_grid, DriverSetup, GridEntry, GridSlot, GRID_LANE_OFFSET, GRID_ROW_SPACING};
pub use progress::{advance_progress, track_vehicle_progress};
pub use standings::{compute_standings, update_race_standings, StandingEntry, MIN_GAP_SPEED};

/// Запас за краем трассы до VehicleOffTrack (метры)
pub const DEFAULT_OFF_TRACK_MARGIN: f32 = 2.0;

/// Event: команда гонке
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceSignal {
    Start,
    Stop,
}

/// Resource: трасса текущей гонки (shared с контроллерами через Arc)
#[derive(Resource, Debug, Clone)]
pub struct RaceTrack {
    pub line: Arc<RacingLine>,
    pub laps: u32,
    pub off_track_margin: f32,
}

impl RaceTrack {
    pub fn new(line: Arc<RacingLine>, laps: u32) -> Self {
        Self {
            line,
            laps: laps.max(1),
            off_track_margin: DEFAULT_OFF_TRACK_MARGIN,
        }
    }
}

/// Resource: идёт ли гонка, часы, порядок финиша
#[derive(Resource, Debug, Clone, Default)]
pub struct RaceStatus {
    pub running: bool,
    /// Секунды с RaceSignal::Start
    pub elapsed: f32,
    pub finish_order: Vec<Entity>,
}

impl RaceStatus {
    pub fn is_finished(&self) -> bool {
        !self.running && !self.finish_order.is_empty()
    }
}

/// Plugin: race director (FixedUpdate, RaceSet::Director)
///
/// Порядок: сигналы → прогресс → финиш → standings
pub struct RaceDirectorPlugin;

impl Plugin for RaceDirectorPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<RaceSignal>()
            .add_event::<VehicleOffTrack>()
            .init_resource::<RaceStatus>()
            .add_systems(
                FixedUpdate,
                (
                    handle_race_signals,
                    track_vehicle_progress,
                    check_finishers,
                    update_race_standings,
                )
                    .chain()
                    .in_set(RaceSet::Director),
            );
    }
}
