//! Racing line - замкнутая последовательность waypoint'ов с целевыми скоростями.
//!
//! Владелец - race director (Arc), контроллеры только читают.
//! Инвариант: минимум MIN_RACING_LINE_POINTS точек, все координаты finite,
//! поэтому lookup'ы всегда возвращают &RacingLinePoint (без default-точек).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{RacerAIError, Result};

pub const MIN_RACING_LINE_POINTS: usize = 3;

/// Окно поиска ближайшей точки вокруг текущего индекса (назад / вперёд)
const CLOSEST_SEARCH_BEHIND: usize = 10;
const CLOSEST_SEARCH_AHEAD: usize = 20;

/// Waypoint racing line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RacingLinePoint {
    pub position: Vec3,
    /// Направление к следующей точке (normalized), пересчитывается в RacingLine::new
    pub direction: Vec3,
    /// Целевая скорость (m/s)
    pub target_speed: f32,
    /// Ширина трассы (метры)
    pub track_width: f32,
    /// Дистанция от старта (метры), пересчитывается в RacingLine::new
    pub distance_along_track: f32,
    pub is_apex: bool,
    pub is_braking_zone: bool,
    pub is_acceleration_zone: bool,
    /// 1/радиус
    pub curvature: f32,
    /// Множитель сцепления покрытия (1.0 = сухой асфальт)
    pub grip_level: f32,
    pub optimal_gear: i32,
    pub is_overtaking_zone: bool,
    pub camber_angle: f32,
}

impl Default for RacingLinePoint {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            target_speed: 100.0,
            track_width: 10.0,
            distance_along_track: 0.0,
            is_apex: false,
            is_braking_zone: false,
            is_acceleration_zone: false,
            curvature: 0.0,
            grip_level: 1.0,
            optimal_gear: 3,
            is_overtaking_zone: false,
            camber_angle: 0.0,
        }
    }
}

impl RacingLinePoint {
    fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.direction.is_finite()
            && self.target_speed.is_finite()
            && self.track_width.is_finite()
            && self.grip_level.is_finite()
            && self.curvature.is_finite()
            && self.camber_angle.is_finite()
    }

    pub fn at(position: Vec3, target_speed: f32) -> Self {
        Self {
            position,
            target_speed,
            ..Default::default()
        }
    }
}

/// Замкнутая racing line (последняя точка соединена с первой)
#[derive(Debug, Clone)]
pub struct RacingLine {
    points: Vec<RacingLinePoint>,
    /// segment_lengths[i] - длина сегмента i → (i + 1) % n
    segment_lengths: Vec<f32>,
    total_length: f32,
}

impl RacingLine {
    /// Валидирует точки и пересчитывает distance_along_track + direction.
    ///
    /// direction берётся из геометрии (к следующей точке); заданное значение
    /// остаётся только у точки-дубликата с сегментом нулевой длины.
    pub fn new(mut points: Vec<RacingLinePoint>) -> Result<Self> {
        if points.len() < MIN_RACING_LINE_POINTS {
            return Err(RacerAIError::RacingLineTooShort {
                min: MIN_RACING_LINE_POINTS,
                got: points.len(),
            });
        }

        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(RacerAIError::NonFinitePoint { index });
        }

        let count = points.len();
        let mut segment_lengths = Vec::with_capacity(count);
        let mut accumulated = 0.0;

        for i in 0..count {
            let next = (i + 1) % count;
            let segment = points[next].position - points[i].position;
            let length = segment.length();
            if let Some(direction) = segment.try_normalize() {
                points[i].direction = direction;
            }
            points[i].distance_along_track = accumulated;
            accumulated += length;
            segment_lengths.push(length);
        }

        Ok(Self {
            points,
            segment_lengths,
            total_length: accumulated,
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let points: Vec<RacingLinePoint> = serde_json::from_str(json)?;
        Self::new(points)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Всегда false (инвариант конструктора), есть для clippy::len_without_is_empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[RacingLinePoint] {
        &self.points
    }

    pub fn point(&self, index: usize) -> &RacingLinePoint {
        &self.points[index % self.points.len()]
    }

    pub fn total_length(&self) -> f32 {
        self.total_length
    }

    /// Дистанция от старта до точки (метры)
    pub fn distance_at(&self, index: usize) -> f32 {
        self.point(index).distance_along_track
    }

    /// Прогресс круга 0..1 для точки
    pub fn progress_at(&self, index: usize) -> f32 {
        if self.total_length <= f32::EPSILON {
            return 0.0;
        }
        self.distance_at(index) / self.total_length
    }

    /// Дистанция вперёд по линии от `from` до `to` (с переходом через старт)
    pub fn forward_distance(&self, from: usize, to: usize) -> f32 {
        let from_distance = self.distance_at(from);
        let to_distance = self.distance_at(to);
        if to_distance >= from_distance {
            to_distance - from_distance
        } else {
            self.total_length - from_distance + to_distance
        }
    }

    /// Индекс точки на `distance` метров вперёд от `from` (круг замкнут)
    pub fn index_ahead(&self, from: usize, distance: f32) -> usize {
        let count = self.points.len();
        let mut index = from % count;
        let mut accumulated = 0.0;

        // Максимум один круг, чтобы огромный look-ahead не крутился вечно
        for _ in 0..count {
            if accumulated >= distance {
                break;
            }
            accumulated += self.segment_lengths[index];
            index = (index + 1) % count;
        }

        index
    }

    pub fn point_ahead(&self, from: usize, distance: f32) -> &RacingLinePoint {
        self.point(self.index_ahead(from, distance))
    }

    /// Ближайшая точка в окне вокруг `hint` (-10..+20, с переходом через старт)
    pub fn closest_point_near(&self, position: Vec3, hint: usize) -> usize {
        let count = self.points.len();
        let window = CLOSEST_SEARCH_BEHIND + CLOSEST_SEARCH_AHEAD + 1;

        if window >= count {
            return self.closest_point(position);
        }

        let start = (hint % count + count - CLOSEST_SEARCH_BEHIND) % count;
        let mut best_index = start;
        let mut best_distance_sq = f32::MAX;

        for offset in 0..window {
            let index = (start + offset) % count;
            let distance_sq = position.distance_squared(self.points[index].position);
            if distance_sq < best_distance_sq {
                best_distance_sq = distance_sq;
                best_index = index;
            }
        }

        best_index
    }

    /// Полный перебор (для спавна / телепорта, когда hint неизвестен)
    pub fn closest_point(&self, position: Vec3) -> usize {
        self.points
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                position
                    .distance_squared(a.position)
                    .total_cmp(&position.distance_squared(b.position))
            })
            .map(|(index, _)| index)
            .unwrap_or(0)
    }
}
