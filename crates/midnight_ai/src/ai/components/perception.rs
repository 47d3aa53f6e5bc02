//! Perception: что AI водитель «видит» вокруг себя.
//!
//! Пересчитывается каждый tick из snapshot'ов всех машин (без ownership,
//! только Entity + скопированные позиция/скорость).

use bevy::prelude::*;

/// Closing speed ниже этого порога → time-to-collision не считаем (m/s)
pub const MIN_CLOSING_SPEED: f32 = 1.0;

/// Конус «впереди» / «сзади» для выбора соперника (градусы)
const AHEAD_CONE: f32 = 60.0;
const BEHIND_CONE: f32 = 120.0;

/// Копия состояния машины на момент tick'а
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleSnapshot {
    pub entity: Entity,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Normalized forward (в Bevy - локальный -Z)
    pub forward: Vec3,
    pub is_player: bool,
}

impl VehicleSnapshot {
    pub fn from_transform(entity: Entity, transform: &Transform, velocity: Vec3, is_player: bool) -> Self {
        Self {
            entity,
            position: transform.translation,
            velocity,
            forward: transform.forward().as_vec3(),
            is_player,
        }
    }

    /// Right = forward × up
    pub fn right(&self) -> Vec3 {
        self.forward.cross(Vec3::Y).normalize_or_zero()
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

/// Восприятие одной соседней машины
#[derive(Debug, Clone, PartialEq)]
pub struct VehiclePerception {
    pub vehicle: Entity,
    pub relative_position: Vec3,
    pub relative_velocity: Vec3,
    pub distance: f32,
    /// Угол к машине (градусы): 0 - прямо по курсу, + справа, ±180 сзади
    pub angle: f32,
    pub is_ahead: bool,
    pub is_on_left: bool,
    /// None - не сближаемся (closing speed < MIN_CLOSING_SPEED)
    pub time_to_collision: Option<f32>,
    /// Моя скорость минус их (> 0 - я быстрее)
    pub speed_difference: f32,
    pub is_player: bool,
    /// Я в их слипстриме
    pub in_slipstream_range: bool,
    pub other_position: Vec3,
    pub other_forward: Vec3,
    pub other_speed: f32,
}

/// Параметры perception (из RacerTuning)
#[derive(Debug, Clone, Copy)]
pub struct PerceptionParams {
    pub radius: f32,
    pub slipstream_range: f32,
    /// Градусы
    pub slipstream_angle: f32,
}

/// Строит отсортированный по дистанции список соседей в радиусе
pub fn perceive(me: &VehicleSnapshot, others: &[VehicleSnapshot], params: PerceptionParams) -> Vec<VehiclePerception> {
    let my_right = me.right();
    let my_speed = me.speed();

    let mut perceived: Vec<VehiclePerception> = others
        .iter()
        .filter(|other| other.entity != me.entity)
        .filter_map(|other| {
            let relative_position = other.position - me.position;
            let distance = relative_position.length();
            if distance > params.radius {
                return None;
            }

            let to_other = relative_position.normalize_or_zero();
            let dot_forward = me.forward.dot(to_other);
            let dot_right = my_right.dot(to_other);

            let relative_velocity = other.velocity - me.velocity;
            let closing_speed = -relative_velocity.dot(to_other);
            let time_to_collision = (closing_speed > MIN_CLOSING_SPEED).then(|| distance / closing_speed);

            Some(VehiclePerception {
                vehicle: other.entity,
                relative_position,
                relative_velocity,
                distance,
                angle: dot_right.atan2(dot_forward).to_degrees(),
                is_ahead: dot_forward > 0.0,
                is_on_left: dot_right < 0.0,
                time_to_collision,
                speed_difference: my_speed - other.speed(),
                is_player: other.is_player,
                in_slipstream_range: is_in_slipstream(me.position, other, params),
                other_position: other.position,
                other_forward: other.forward,
                other_speed: other.speed(),
            })
        })
        .collect();

    perceived.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    perceived
}

/// Я позади lead машины, в пределах дальности и конуса слипстрима
pub fn is_in_slipstream(my_position: Vec3, lead: &VehicleSnapshot, params: PerceptionParams) -> bool {
    let to_us = my_position - lead.position;
    let distance = to_us.length();
    if distance > params.slipstream_range || distance < 0.001 {
        return false;
    }

    let dot_back = to_us.normalize_or_zero().dot(-lead.forward);
    if dot_back <= 0.0 {
        return false;
    }

    dot_back.clamp(-1.0, 1.0).acos().to_degrees() < params.slipstream_angle
}

/// Ближайшая машина впереди в конусе ±60°
pub fn vehicle_ahead(perceived: &[VehiclePerception]) -> Option<&VehiclePerception> {
    perceived.iter().find(|p| p.is_ahead && p.angle.abs() < AHEAD_CONE)
}

/// Ближайшая машина сзади в конусе ±60° от кормы
pub fn vehicle_behind(perceived: &[VehiclePerception]) -> Option<&VehiclePerception> {
    perceived.iter().find(|p| !p.is_ahead && p.angle.abs() > BEHIND_CONE)
}

pub fn find_perceived(perceived: &[VehiclePerception], entity: Entity) -> Option<&VehiclePerception> {
    perceived.iter().find(|p| p.vehicle == entity)
}
