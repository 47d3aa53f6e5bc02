//! RacerTuning - настраиваемые константы контроллера (JSON конфиг).

use serde::{Deserialize, Serialize};

use crate::error::{RacerAIError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RacerTuning {
    /// Look-ahead для точки руления (метры)
    pub steering_look_ahead: f32,
    /// Look-ahead для торможения перед поворотом (метры)
    pub speed_look_ahead: f32,
    /// Радиус восприятия соседей (метры)
    pub perception_radius: f32,
    /// Минимальная дистанция следования без профиля (секунды)
    pub min_following_gap: f32,
    /// Базовый шанс обгона без профиля 0..1
    pub overtake_threshold: f32,
    /// Лимит попытки обгона без профиля (секунды)
    pub max_overtake_time: f32,

    pub steering_p_gain: f32,
    pub steering_i_gain: f32,
    pub steering_d_gain: f32,

    /// Конус слипстрима (градусы)
    pub slipstream_angle: f32,
    /// Дальность слипстрима (метры)
    pub slipstream_range: f32,

    /// Пауза между попытками обгона (секунды)
    pub overtake_cooldown: f32,
    /// Множитель target speed в Caution
    pub caution_speed_factor: f32,
    /// Recovering → Racing только ближе этого к racing line (метры)
    pub recovery_rejoin_distance: f32,
    /// Target speed без racing line (m/s)
    pub default_target_speed: f32,
    /// Расчётное замедление для braking distance (m/s²)
    pub braking_decel: f32,
}

impl Default for RacerTuning {
    fn default() -> Self {
        Self {
            steering_look_ahead: 15.0,
            speed_look_ahead: 30.0,
            perception_radius: 50.0,
            min_following_gap: 1.0,
            overtake_threshold: 0.7,
            max_overtake_time: 8.0,
            steering_p_gain: 2.0,
            steering_i_gain: 0.1,
            steering_d_gain: 0.5,
            slipstream_angle: 15.0,
            slipstream_range: 25.0,
            overtake_cooldown: 2.0,
            caution_speed_factor: 0.6,
            recovery_rejoin_distance: 5.0,
            default_target_speed: 50.0,
            braking_decel: 12.0,
        }
    }
}

impl RacerTuning {
    pub fn from_json(json: &str) -> Result<Self> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("steering_look_ahead", self.steering_look_ahead),
            ("speed_look_ahead", self.speed_look_ahead),
            ("perception_radius", self.perception_radius),
            ("min_following_gap", self.min_following_gap),
            ("max_overtake_time", self.max_overtake_time),
            ("slipstream_angle", self.slipstream_angle),
            ("slipstream_range", self.slipstream_range),
            ("recovery_rejoin_distance", self.recovery_rejoin_distance),
            ("default_target_speed", self.default_target_speed),
            ("braking_decel", self.braking_decel),
        ];

        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(RacerAIError::InvalidTuning(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        let non_negative = [
            ("steering_p_gain", self.steering_p_gain),
            ("steering_i_gain", self.steering_i_gain),
            ("steering_d_gain", self.steering_d_gain),
            ("overtake_cooldown", self.overtake_cooldown),
        ];

        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(RacerAIError::InvalidTuning(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.overtake_threshold) {
            return Err(RacerAIError::InvalidTuning(format!(
                "overtake_threshold must be within 0..1, got {}",
                self.overtake_threshold
            )));
        }

        if !(self.caution_speed_factor > 0.0 && self.caution_speed_factor <= 1.0) {
            return Err(RacerAIError::InvalidTuning(format!(
                "caution_speed_factor must be within (0, 1], got {}",
                self.caution_speed_factor
            )));
        }

        Ok(())
    }
}
