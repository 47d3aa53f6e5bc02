//! Стартовая решётка: машины + AI контроллеры.

use std::sync::Arc;

use bevy::prelude::*;

use crate::ai::components::{DriverProfile, RacerTuning};
use crate::ai::controller::RacerController;
use crate::components::{PlayerControlled, TrackProgress, Vehicle, VehicleBody, VehicleInput, VehicleSpec};
use crate::track::RacingLine;

/// Расстояние между рядами решётки (метры)
pub const GRID_ROW_SPACING: f32 = 8.0;
/// Смещение машины от racing line в ряду (метры)
pub const GRID_LANE_OFFSET: f32 = 2.5;

/// Участник гонки
#[derive(Debug, Clone)]
pub struct GridEntry {
    pub name: String,
    /// None → игрок (без контроллера)
    pub driver: Option<DriverSetup>,
    pub spec: VehicleSpec,
}

/// Настройки AI водителя
#[derive(Debug, Clone)]
pub struct DriverSetup {
    pub profile: Option<Arc<DriverProfile>>,
    pub tuning: RacerTuning,
    pub difficulty: f32,
    pub rubber_banding: bool,
}

impl GridEntry {
    pub fn ai(name: impl Into<String>, profile: Option<DriverProfile>) -> Self {
        Self {
            name: name.into(),
            driver: Some(DriverSetup {
                profile: profile.map(Arc::new),
                tuning: RacerTuning::default(),
                difficulty: 1.0,
                rubber_banding: true,
            }),
            spec: VehicleSpec::default(),
        }
    }

    pub fn player(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            driver: None,
            spec: VehicleSpec::default(),
        }
    }

    pub fn with_spec(mut self, spec: VehicleSpec) -> Self {
        self.spec = spec;
        self
    }

    pub fn with_difficulty(mut self, difficulty: f32) -> Self {
        if let Some(driver) = self.driver.as_mut() {
            driver.difficulty = difficulty;
        }
        self
    }

    pub fn with_rubber_banding(mut self, enabled: bool) -> Self {
        if let Some(driver) = self.driver.as_mut() {
            driver.rubber_banding = enabled;
        }
        self
    }
}

/// Результат спавна одного участника
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSlot {
    pub vehicle: Entity,
    /// None для игрока
    pub controller: Option<Entity>,
}

/// Позиция и направление слота `slot` (по два в ряд, ряды назад от старта)
pub fn grid_transform(line: &RacingLine, slot: usize) -> Transform {
    let row = slot / 2;
    let back = GRID_ROW_SPACING * (row + 1) as f32;
    let target = (line.total_length() - back).rem_euclid(line.total_length());

    // Последняя точка до target + остаток вдоль её направления
    let index = (0..line.len())
        .rev()
        .find(|&i| line.distance_at(i) <= target)
        .unwrap_or(0);
    let point = line.point(index);
    let on_line = point.position + point.direction * (target - point.distance_along_track);

    let right = point.direction.cross(Vec3::Y).normalize_or_zero();
    let side = if slot % 2 == 0 { -1.0 } else { 1.0 };
    let position = on_line + right * side * GRID_LANE_OFFSET;

    Transform::from_translation(position).looking_to(point.direction, Vec3::Y)
}

/// Спавнит решётку. AI контроллер - отдельная entity, управляет машиной через possess.
pub fn spawn_grid(commands: &mut Commands, line: &Arc<RacingLine>, entries: &[GridEntry]) -> Vec<GridSlot> {
    entries
        .iter()
        .enumerate()
        .map(|(slot, entry)| {
            let mut vehicle = commands.spawn((
                Vehicle::new(entry.name.clone()),
                entry.spec,
                VehicleBody::default(),
                VehicleInput::default(),
                TrackProgress::default(),
                grid_transform(line, slot),
            ));

            let Some(driver) = entry.driver.as_ref() else {
                let vehicle = vehicle.insert(PlayerControlled).id();
                crate::log(&format!("🎮 {} on grid slot {} (player)", entry.name, slot + 1));
                return GridSlot { vehicle, controller: None };
            };
            let vehicle = vehicle.id();

            let mut controller = RacerController::new(driver.tuning.clone());
            controller.set_driver_profile(driver.profile.clone());
            controller.set_difficulty_multiplier(driver.difficulty);
            controller.set_rubber_banding_enabled(driver.rubber_banding);
            controller.set_racing_line(Arc::clone(line));
            controller.possess(vehicle);

            let controller = commands.spawn(controller).id();
            crate::log(&format!("🤖 {} on grid slot {} (AI)", entry.name, slot + 1));

            GridSlot {
                vehicle,
                controller: Some(controller),
            }
        })
        .collect()
}
