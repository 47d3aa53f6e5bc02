//! Driver profile: read-only настройки AI водителя.
//!
//! Профиль общий (Arc) для контроллера и race director'а. Всё изменяемое
//! во время гонки (эскалация, обиды, настроение) живёт в Temperament.

use serde::{Deserialize, Serialize};

use super::state::ContactResponse;
use crate::error::{RacerAIError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Personality {
    Aggressive,
    Defensive,
    Calculated,
    Unpredictable,
    Rookie,
    #[default]
    Veteran,
    Rival,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillParams {
    /// Общий уровень 0..1
    pub skill_level: f32,
    pub braking_accuracy: f32,
    pub line_accuracy: f32,
    pub consistency: f32,
    /// Влияет на длительность recovery после вылета
    pub recovery_skill: f32,
    /// 0..1, шанс ошибки ×0.005 за tick
    pub mistake_frequency: f32,
    /// Секунды
    pub reaction_time: f32,
}

impl Default for SkillParams {
    fn default() -> Self {
        Self {
            skill_level: 0.7,
            braking_accuracy: 0.7,
            line_accuracy: 0.7,
            consistency: 0.7,
            recovery_skill: 0.5,
            mistake_frequency: 0.2,
            reaction_time: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggressionParams {
    pub aggression: f32,
    pub overtake_aggression: f32,
    pub defense_aggression: f32,
    pub risk_taking: f32,
    /// 0 - держит дистанцию 1.5 s, 1 - 0.5 s
    pub proximity_tolerance: f32,
    /// Секунды; лимит попытки обгона = patience × 2
    pub overtake_patience: f32,
    pub targets_player: bool,

    // Эскалация агрессии от контактов
    pub escalation_rate: f32,
    pub deescalation_rate: f32,
    pub major_contact_threshold: f32,
    pub minor_contact_response: ContactResponse,
    pub major_contact_response: ContactResponse,
    pub high_aggression_threshold: f32,
    pub max_aggression_threshold: f32,
    pub can_enter_rage: bool,
    /// Секунды, сколько помним обидчика
    pub grudge_memory_duration: f32,
}

impl Default for AggressionParams {
    fn default() -> Self {
        Self {
            aggression: 0.5,
            overtake_aggression: 0.5,
            defense_aggression: 0.5,
            risk_taking: 0.5,
            proximity_tolerance: 0.5,
            overtake_patience: 3.0,
            targets_player: false,
            escalation_rate: 0.3,
            deescalation_rate: 0.5,
            major_contact_threshold: 0.5,
            minor_contact_response: ContactResponse::Ignore,
            major_contact_response: ContactResponse::BackOff,
            high_aggression_threshold: 0.6,
            max_aggression_threshold: 0.8,
            can_enter_rage: true,
            grudge_memory_duration: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedParams {
    /// Множитель target speed (0.5..1.1)
    pub base_speed_percent: f32,
    pub corner_speed_multiplier: f32,
    pub straight_speed_multiplier: f32,
    /// Проценты за tick в зоне разгона
    pub nos_usage_frequency: f32,
}

impl Default for SpeedParams {
    fn default() -> Self {
        Self {
            base_speed_percent: 1.0,
            corner_speed_multiplier: 1.0,
            straight_speed_multiplier: 1.0,
            nos_usage_frequency: 2.0,
        }
    }
}

/// Поведенческие склонности, которые модифицируют steering output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalityBehaviors {
    /// > 0 - тормозит позже, < 0 - раньше (-1..1)
    pub brake_point_bias: f32,
    /// Готовность ехать колесо в колесо (множитель confidence)
    pub side_by_side_willingness: f32,
}

impl Default for PersonalityBehaviors {
    fn default() -> Self {
        Self {
            brake_point_bias: 0.0,
            side_by_side_willingness: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverProfile {
    pub name: String,
    pub personality: Personality,
    pub skill: SkillParams,
    pub aggression: AggressionParams,
    pub speed: SpeedParams,
    pub behaviors: PersonalityBehaviors,
}

impl DriverProfile {
    /// Профиль с пресетом параметров под personality
    pub fn preset(name: impl Into<String>, personality: Personality) -> Self {
        let mut profile = Self {
            name: name.into(),
            personality,
            ..Default::default()
        };

        let skill = &mut profile.skill;
        let aggression = &mut profile.aggression;
        let behaviors = &mut profile.behaviors;

        match personality {
            Personality::Aggressive => {
                aggression.aggression = 0.8;
                aggression.overtake_aggression = 0.85;
                aggression.risk_taking = 0.75;
                aggression.proximity_tolerance = 0.8;
                aggression.overtake_patience = 2.0;
                aggression.minor_contact_response = ContactResponse::Mirror;
                aggression.major_contact_response = ContactResponse::Retaliate;
                behaviors.brake_point_bias = 0.3;
                behaviors.side_by_side_willingness = 0.8;
            }
            Personality::Defensive => {
                aggression.aggression = 0.4;
                aggression.defense_aggression = 0.8;
                aggression.overtake_aggression = 0.35;
                aggression.major_contact_response = ContactResponse::Protect;
                behaviors.brake_point_bias = -0.2;
                behaviors.side_by_side_willingness = 0.4;
            }
            Personality::Calculated => {
                skill.skill_level = 0.85;
                skill.consistency = 0.9;
                skill.braking_accuracy = 0.85;
                aggression.risk_taking = 0.35;
                aggression.overtake_patience = 5.0;
                aggression.major_contact_response = ContactResponse::Report;
            }
            Personality::Unpredictable => {
                skill.consistency = 0.4;
                skill.mistake_frequency = 0.4;
                aggression.aggression = 0.6;
                aggression.risk_taking = 0.7;
                aggression.minor_contact_response = ContactResponse::Mirror;
            }
            Personality::Rookie => {
                skill.skill_level = 0.45;
                skill.braking_accuracy = 0.5;
                skill.line_accuracy = 0.5;
                skill.consistency = 0.5;
                skill.recovery_skill = 0.3;
                skill.mistake_frequency = 0.5;
                aggression.aggression = 0.3;
                aggression.overtake_aggression = 0.3;
                aggression.major_contact_response = ContactResponse::Protect;
                behaviors.brake_point_bias = -0.4;
                behaviors.side_by_side_willingness = 0.2;
            }
            Personality::Veteran => {
                skill.skill_level = 0.85;
                skill.recovery_skill = 0.8;
                skill.consistency = 0.85;
                behaviors.side_by_side_willingness = 0.7;
            }
            Personality::Rival => {
                skill.skill_level = 0.9;
                aggression.aggression = 0.7;
                aggression.overtake_aggression = 0.75;
                aggression.targets_player = true;
                aggression.major_contact_response = ContactResponse::Retaliate;
                behaviors.brake_point_bias = 0.25;
            }
        }

        profile
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let profile: Self = serde_json::from_str(json)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Все нормированные параметры в 0..1, длительности положительные
    pub fn validate(&self) -> Result<()> {
        let unit = [
            ("skill_level", self.skill.skill_level),
            ("braking_accuracy", self.skill.braking_accuracy),
            ("line_accuracy", self.skill.line_accuracy),
            ("consistency", self.skill.consistency),
            ("recovery_skill", self.skill.recovery_skill),
            ("mistake_frequency", self.skill.mistake_frequency),
            ("aggression", self.aggression.aggression),
            ("overtake_aggression", self.aggression.overtake_aggression),
            ("defense_aggression", self.aggression.defense_aggression),
            ("risk_taking", self.aggression.risk_taking),
            ("proximity_tolerance", self.aggression.proximity_tolerance),
            ("side_by_side_willingness", self.behaviors.side_by_side_willingness),
        ];

        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(RacerAIError::InvalidProfile(format!(
                    "{}: {} must be within 0..1, got {}",
                    self.name, name, value
                )));
            }
        }

        let positive = [
            ("overtake_patience", self.aggression.overtake_patience),
            ("grudge_memory_duration", self.aggression.grudge_memory_duration),
            ("base_speed_percent", self.speed.base_speed_percent),
        ];

        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(RacerAIError::InvalidProfile(format!(
                    "{}: {} must be positive, got {}",
                    self.name, name, value
                )));
            }
        }

        if !(-1.0..=1.0).contains(&self.behaviors.brake_point_bias) {
            return Err(RacerAIError::InvalidProfile(format!(
                "{}: brake_point_bias must be within -1..1, got {}",
                self.name, self.behaviors.brake_point_bias
            )));
        }

        Ok(())
    }

    /// Копия профиля под уровень сложности (race setup, до старта)
    pub fn with_difficulty(&self, modifier: f32) -> Self {
        let modifier = modifier.max(0.1);
        let mut adjusted = self.clone();

        let skill = &mut adjusted.skill;
        skill.skill_level = (skill.skill_level * modifier).clamp(0.0, 1.0);
        skill.braking_accuracy = (skill.braking_accuracy * modifier).clamp(0.0, 1.0);
        skill.line_accuracy = (skill.line_accuracy * modifier).clamp(0.0, 1.0);
        skill.consistency = (skill.consistency * modifier).clamp(0.0, 1.0);
        skill.reaction_time = (skill.reaction_time / modifier).clamp(0.1, 1.0);
        skill.mistake_frequency = (skill.mistake_frequency / modifier).clamp(0.0, 1.0);

        let speed = &mut adjusted.speed;
        speed.base_speed_percent = (speed.base_speed_percent * modifier).clamp(0.5, 1.1);
        speed.corner_speed_multiplier = (speed.corner_speed_multiplier * modifier).clamp(0.7, 1.1);

        adjusted
    }

    /// Минимальная дистанция следования (секунды)
    pub fn min_following_gap(&self) -> f32 {
        let t = self.aggression.proximity_tolerance.clamp(0.0, 1.0);
        1.5 + (0.5 - 1.5) * t
    }

    pub fn contact_response(&self, severity: f32) -> ContactResponse {
        if severity >= self.aggression.major_contact_threshold {
            self.aggression.major_contact_response
        } else {
            self.aggression.minor_contact_response
        }
    }

    /// Базовый разброс руления по personality (до consistency/difficulty)
    pub fn steering_noise(&self) -> f32 {
        match self.personality {
            Personality::Unpredictable => 0.08,
            Personality::Rookie => 0.05,
            Personality::Calculated => 0.01,
            _ => 0.02,
        }
    }
}
