//! Погодные условия трассы (grip, видимость, сложность).
//!
//! Единый resource вместо weather subsystem: AI читает его в target speed,
//! braking distance и решении об обгоне.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConditions {
    /// Множитель сцепления (дождь, лужи, температура) - 1.0 сухо
    pub grip: f32,
    /// Множитель восприятия AI (туман, ночь) - 1.0 идеально
    pub visibility: f32,
    /// Рейтинг сложности погоды 1 (ясно) ..= 5 (шторм)
    pub difficulty_rating: u8,
    /// Aquaplaning / сильный шторм
    pub hazardous: bool,
}

impl Default for TrackConditions {
    fn default() -> Self {
        Self::clear()
    }
}

impl TrackConditions {
    pub fn clear() -> Self {
        Self {
            grip: 1.0,
            visibility: 1.0,
            difficulty_rating: 1,
            hazardous: false,
        }
    }

    pub fn rain() -> Self {
        Self {
            grip: 0.75,
            visibility: 0.7,
            difficulty_rating: 3,
            hazardous: false,
        }
    }

    pub fn storm() -> Self {
        Self {
            grip: 0.55,
            visibility: 0.45,
            difficulty_rating: 5,
            hazardous: true,
        }
    }

    /// Множитель шанса обгона: рейтинг 1 без штрафа, 2..5 → 0.7..0.2, hazardous ×0.5
    pub fn overtake_penalty(&self) -> f32 {
        let mut penalty = 1.0;
        if self.difficulty_rating >= 2 {
            let t = (self.difficulty_rating.min(5) as f32 - 2.0) / 3.0;
            penalty *= 0.7 + (0.2 - 0.7) * t;
        }
        if self.hazardous {
            penalty *= 0.5;
        }
        penalty
    }

    /// Доля снижения скорости из-за плохой видимости (0 при visibility ≥ 0.8).
    ///
    /// `skill` - None без профиля (фиксированный коэффициент 0.2).
    pub fn visibility_caution(&self, skill: Option<f32>) -> f32 {
        if self.visibility >= 0.8 {
            return 0.0;
        }
        let loss = 1.0 - self.visibility.clamp(0.0, 1.0);
        match skill {
            Some(skill) => {
                let skill = skill.clamp(0.0, 1.0);
                loss * 0.3 + (loss * 0.1 - loss * 0.3) * skill
            }
            None => loss * 0.2,
        }
    }
}
