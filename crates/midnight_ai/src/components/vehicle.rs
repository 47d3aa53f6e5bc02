//! Vehicle компоненты: тело, характеристики, входы управления.
//!
//! Одинаковы для AI и игрока: AI влияет только на VehicleInput,
//! VehicleSpec никогда не меняется во время гонки.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Marker: entity - машина-участник гонки
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct Vehicle {
    /// Имя для логов и таблицы результатов
    pub name: String,
}

impl Vehicle {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Marker: машиной управляет игрок (AI учитывает в решениях об обгоне/защите)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct PlayerControlled;

/// Текущая скорость машины (m/s, world space)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct VehicleBody {
    pub velocity: Vec3,
}

/// Физические характеристики машины
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct VehicleSpec {
    /// Максимальная скорость (m/s)
    pub max_speed: f32,
    /// Ускорение при полном газе (m/s²)
    pub acceleration: f32,
    /// Замедление при полном тормозе (m/s²)
    pub braking_decel: f32,
    /// Максимальная скорость поворота (rad/s)
    pub max_yaw_rate: f32,
    /// Сопротивление качению + воздуха (1/s)
    pub drag: f32,
    /// Множитель ускорения под NOS
    pub nos_multiplier: f32,
}

impl Default for VehicleSpec {
    fn default() -> Self {
        Self {
            max_speed: 75.0,      // ~270 km/h
            acceleration: 8.0,
            braking_decel: 12.0,  // Совпадает с DefaultBrakingDecel AI
            max_yaw_rate: 1.2,
            drag: 0.1,
            nos_multiplier: 1.5,
        }
    }
}

/// Входы управления (пишет AI tick или player input)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct VehicleInput {
    /// -1..1, положительное - вправо
    pub steering: f32,
    pub throttle: f32,
    pub brake: f32,
    pub handbrake: bool,
    pub nos: bool,
}

impl VehicleInput {
    /// Полный тормоз (финиш, остановка гонки)
    pub fn full_brake() -> Self {
        Self {
            brake: 1.0,
            ..Default::default()
        }
    }
}

/// Прогресс машины по racing line (обновляет race director)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct TrackProgress {
    /// Индекс ближайшей точки racing line
    pub line_index: usize,
    pub laps_completed: u32,
    /// Пройденная дистанция за всю гонку (метры, до старта отрицательная)
    pub race_distance: f32,
    /// Боковое отклонение от racing line (метры)
    pub lateral_offset: f32,
    pub off_track: bool,
}
