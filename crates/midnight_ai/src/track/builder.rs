//! RacingLineBuilder - centerline → RacingLine с целевыми скоростями.
//!
//! Pipeline:
//! 1. Кривизна (Menger) в каждой точке
//! 2. Скорость прохождения поворота: sqrt(lateral_g · g / k)
//! 3. Backward pass (успеваем ли затормозить), forward pass (успеваем ли разогнаться)
//! 4. Флаги: apex / braking / acceleration / overtaking zone
//!
//! Круг замкнут, поэтому оба прохода делаются дважды (значения «заворачивают» через старт).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::racing_line::{RacingLine, RacingLinePoint, MIN_RACING_LINE_POINTS};
use crate::error::{RacerAIError, Result};

const GRAVITY: f32 = 9.81;

/// Ниже этой кривизны участок считается прямой
const STRAIGHT_CURVATURE: f32 = 0.001;
/// Минимальная кривизна для apex
const APEX_CURVATURE: f32 = 0.01;
/// Падение скорости к следующей точке, с которого точка считается braking zone (m/s)
const BRAKING_DROP: f32 = 0.05;

/// Параметры генерации racing line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RacingLineParams {
    /// Максимальная скорость на прямой (m/s)
    pub max_speed: f32,
    /// Допустимая боковая перегрузка (g)
    pub max_lateral_g: f32,
    /// Замедление при торможении (m/s²)
    pub braking_decel: f32,
    /// Ускорение на выходе (m/s²)
    pub acceleration_rate: f32,
    pub track_width: f32,
    pub grip_level: f32,
}

impl Default for RacingLineParams {
    fn default() -> Self {
        Self {
            max_speed: 80.0,
            max_lateral_g: 1.2,
            braking_decel: 12.0,
            acceleration_rate: 6.0,
            track_width: 12.0,
            grip_level: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RacingLineBuilder {
    params: RacingLineParams,
}

impl RacingLineBuilder {
    pub fn new(params: RacingLineParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &RacingLineParams {
        &self.params
    }

    pub fn build(&self, centerline: &[Vec3]) -> Result<RacingLine> {
        self.validate()?;

        let count = centerline.len();
        // Кривизна ниже требует prev/next
        if count < MIN_RACING_LINE_POINTS {
            return Err(RacerAIError::RacingLineTooShort {
                min: MIN_RACING_LINE_POINTS,
                got: count,
            });
        }

        let curvatures: Vec<f32> = (0..count)
            .map(|i| {
                let prev = centerline[(i + count - 1) % count];
                let next = centerline[(i + 1) % count];
                menger_curvature(prev, centerline[i], next)
            })
            .collect();

        let mut speeds: Vec<f32> = curvatures
            .iter()
            .map(|&k| corner_speed(k, self.params.max_lateral_g).min(self.params.max_speed))
            .collect();

        for _ in 0..2 {
            apply_braking_pass(&mut speeds, centerline, self.params.braking_decel);
        }
        for _ in 0..2 {
            apply_acceleration_pass(&mut speeds, centerline, self.params.acceleration_rate);
        }

        let points = (0..count)
            .map(|i| {
                let prev = (i + count - 1) % count;
                let next = (i + 1) % count;

                let is_braking = speeds[next] < speeds[i] - BRAKING_DROP;
                let prev_braking = speeds[i] < speeds[prev] - BRAKING_DROP;
                let is_apex = curvatures[i] > APEX_CURVATURE
                    && curvatures[i] >= curvatures[prev]
                    && curvatures[i] >= curvatures[next];

                RacingLinePoint {
                    position: centerline[i],
                    direction: (centerline[next] - centerline[i]).normalize_or_zero(),
                    target_speed: speeds[i] * self.params.grip_level,
                    track_width: self.params.track_width,
                    distance_along_track: 0.0,
                    is_apex,
                    is_braking_zone: is_braking,
                    is_acceleration_zone: speeds[i] > speeds[prev] + BRAKING_DROP,
                    curvature: curvatures[i],
                    grip_level: 1.0,
                    optimal_gear: optimal_gear(speeds[i]),
                    // Начало зоны торможения - лучшее место для атаки
                    is_overtaking_zone: is_braking && !prev_braking,
                    camber_angle: 0.0,
                }
            })
            .collect();

        RacingLine::new(points)
    }

    fn validate(&self) -> Result<()> {
        let p = &self.params;
        let positive = [
            ("max_speed", p.max_speed),
            ("max_lateral_g", p.max_lateral_g),
            ("braking_decel", p.braking_decel),
            ("acceleration_rate", p.acceleration_rate),
            ("track_width", p.track_width),
            ("grip_level", p.grip_level),
        ];

        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(RacerAIError::InvalidTuning(format!(
                    "racing line param {} must be positive, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

/// k = 4·Area / (|a|·|b|·|c|)
pub fn menger_curvature(p0: Vec3, p1: Vec3, p2: Vec3) -> f32 {
    let a = p1 - p0;
    let b = p2 - p1;
    let c = p0 - p2;

    let area_times_2 = a.cross(b).length();
    let denom = a.length() * b.length() * c.length();

    if denom < 0.0001 {
        return 0.0;
    }

    2.0 * area_times_2 / denom
}

/// v = sqrt(a_lat / k); на прямой - f32::MAX (ограничивает max_speed)
pub fn corner_speed(curvature: f32, max_lateral_g: f32) -> f32 {
    if curvature < STRAIGHT_CURVATURE {
        return f32::MAX;
    }
    (max_lateral_g * GRAVITY / curvature).sqrt()
}

fn apply_braking_pass(speeds: &mut [f32], points: &[Vec3], decel: f32) {
    let count = speeds.len();
    for i in (0..count).rev() {
        let next = (i + 1) % count;
        let distance = points[i].distance(points[next]);
        let max_entry = (speeds[next] * speeds[next] + 2.0 * decel * distance).sqrt();
        speeds[i] = speeds[i].min(max_entry);
    }
}

fn apply_acceleration_pass(speeds: &mut [f32], points: &[Vec3], accel: f32) {
    let count = speeds.len();
    for i in 0..count {
        let prev = (i + count - 1) % count;
        let distance = points[prev].distance(points[i]);
        let max_exit = (speeds[prev] * speeds[prev] + 2.0 * accel * distance).sqrt();
        speeds[i] = speeds[i].min(max_exit);
    }
}

/// Грубая передача по скорости (6 ступеней, ~15 m/s на ступень)
fn optimal_gear(speed: f32) -> i32 {
    (1 + (speed / 15.0) as i32).clamp(1, 6)
}

/// Centerline овала: две прямые + два полукруга, шаг ~`spacing` метров.
///
/// Старт в начале прямой x = +radius, направление -Z (forward в Bevy),
/// оба поворота левые.
pub fn oval_centerline(straight_length: f32, radius: f32, spacing: f32) -> Vec<Vec3> {
    let spacing = spacing.max(0.5);
    let half = straight_length * 0.5;
    let straight_steps = ((straight_length / spacing).ceil() as usize).max(1);
    let arc_steps = ((std::f32::consts::PI * radius / spacing).ceil() as usize).max(2);

    let mut points = Vec::with_capacity(2 * (straight_steps + arc_steps));

    // Прямая 1: x = +radius, z от +half к -half
    for i in 0..straight_steps {
        let t = i as f32 / straight_steps as f32;
        points.push(Vec3::new(radius, 0.0, half - t * straight_length));
    }
    // Поворот 1: центр (0, 0, -half), от angle 0 к PI
    for i in 0..arc_steps {
        let angle = std::f32::consts::PI * i as f32 / arc_steps as f32;
        points.push(Vec3::new(radius * angle.cos(), 0.0, -half - radius * angle.sin()));
    }
    // Прямая 2: x = -radius, z от -half к +half
    for i in 0..straight_steps {
        let t = i as f32 / straight_steps as f32;
        points.push(Vec3::new(-radius, 0.0, -half + t * straight_length));
    }
    // Поворот 2: центр (0, 0, +half)
    for i in 0..arc_steps {
        let angle = std::f32::consts::PI * i as f32 / arc_steps as f32;
        points.push(Vec3::new(-radius * angle.cos(), 0.0, half + radius * angle.sin()));
    }

    points
}
