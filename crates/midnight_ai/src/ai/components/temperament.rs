//! Temperament - изменяемое «настроение» водителя во время гонки.
//!
//! Эскалация агрессии от контактов и давления, обиды (grudges),
//! battle mode и mood. Принадлежит контроллеру, профиль только читается.

use bevy::prelude::*;
use rand::Rng;

use super::profile::{DriverProfile, Personality, PersonalityBehaviors};

/// Порог стадии Elevated
const ELEVATED_THRESHOLD: f32 = 0.4;
/// Верхний предел накопленной агрессии
const MAX_ACCUMULATED: f32 = 1.2;
/// Сколько секунд держится Rage до остывания
const RAGE_COOLDOWN: f32 = 5.0;
/// Период обновления mood (секунды)
const MOOD_UPDATE_INTERVAL: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Reflect)]
pub enum AggressionStage {
    #[default]
    Baseline,
    Elevated,
    High,
    Maximum,
    /// Очень агрессивен, но ошибается
    Rage,
}

impl AggressionStage {
    /// Бонус к escalated aggression
    pub fn bonus(self) -> f32 {
        match self {
            AggressionStage::Baseline => 0.0,
            AggressionStage::Elevated => 0.1,
            AggressionStage::High => 0.2,
            AggressionStage::Maximum => 0.35,
            AggressionStage::Rage => 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum Mood {
    #[default]
    Neutral,
    Confident,
    Frustrated,
    Vengeful,
    Intimidated,
    Desperate,
    InTheZone,
}

/// Запись о контакте с конкретной машиной (основа grudge)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactRecord {
    pub offender: Entity,
    pub was_player: bool,
    /// Максимальная severity 0..1
    pub severity: f32,
    /// Время последнего контакта (секунды гонки)
    pub timestamp: f32,
    pub count: u32,
    pub seemed_intentional: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Temperament {
    accumulated_aggression: f32,
    stage: AggressionStage,
    time_in_stage: f32,
    contacts: Vec<ContactRecord>,
    grudge_target: Option<Entity>,
    battle_opponent: Option<Entity>,
    mood: Mood,

    /// Часы гонки (для timestamp'ов контактов)
    clock: f32,
    mood_timer: f32,
    /// Позиция на момент прошлого обновления mood (None до первого)
    mood_position: Option<u32>,
    impact_since_mood: f32,
    overtaken_since_mood: bool,
}

impl Temperament {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn stage(&self) -> AggressionStage {
        self.stage
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn accumulated_aggression(&self) -> f32 {
        self.accumulated_aggression
    }

    pub fn contacts(&self) -> &[ContactRecord] {
        &self.contacts
    }

    pub fn grudge_target(&self) -> Option<Entity> {
        self.grudge_target
    }

    pub fn battle_opponent(&self) -> Option<Entity> {
        self.battle_opponent
    }

    pub fn in_battle_with(&self, entity: Entity) -> bool {
        self.battle_opponent == Some(entity)
    }

    pub fn record_contact(
        &mut self,
        profile: &DriverProfile,
        offender: Entity,
        severity: f32,
        was_player: bool,
        seemed_intentional: bool,
    ) {
        let params = &profile.aggression;
        let severity = severity.clamp(0.0, 1.0);

        let repeat_count = match self.contacts.iter_mut().find(|c| c.offender == offender) {
            Some(existing) => {
                existing.count += 1;
                existing.severity = existing.severity.max(severity);
                existing.timestamp = self.clock;
                existing.seemed_intentional |= seemed_intentional;
                existing.count
            }
            None => {
                self.contacts.push(ContactRecord {
                    offender,
                    was_player,
                    severity,
                    timestamp: self.clock,
                    count: 1,
                    seemed_intentional,
                });
                1
            }
        };

        let mut escalation = severity * params.escalation_rate;
        if seemed_intentional {
            escalation *= 1.5;
        }
        if repeat_count > 1 {
            escalation *= 1.0 + repeat_count as f32 * 0.2;
        }
        if was_player && params.targets_player {
            escalation *= 1.3;
        }

        self.accumulated_aggression = (self.accumulated_aggression + escalation).clamp(0.0, MAX_ACCUMULATED);
        self.impact_since_mood = self.impact_since_mood.max(severity);

        if severity >= params.major_contact_threshold {
            self.grudge_target = Some(offender);
        }

        self.refresh_stage(profile, 0.0);
    }

    /// Эскалация от давления + естественное остывание + чистка старых обид
    pub fn update_aggression(
        &mut self,
        profile: &DriverProfile,
        delta: f32,
        race_position: u32,
        under_pressure: bool,
        applying_pressure: bool,
    ) {
        let params = &profile.aggression;
        self.clock += delta;
        self.cleanup_expired_grudges(params.grudge_memory_duration);

        if !under_pressure && !applying_pressure && self.contacts.is_empty() {
            let cooldown = params.deescalation_rate * delta * 0.1;
            self.accumulated_aggression = (self.accumulated_aggression - cooldown).max(0.0);
        }

        if under_pressure
            && matches!(profile.personality, Personality::Defensive | Personality::Aggressive)
        {
            self.accumulated_aggression += params.escalation_rate * delta * 0.05;
        }

        if applying_pressure && matches!(profile.personality, Personality::Aggressive | Personality::Rival) {
            self.accumulated_aggression += params.escalation_rate * delta * 0.03;
        }

        if race_position > 1 && self.mood == Mood::Frustrated {
            self.accumulated_aggression += params.escalation_rate * delta * 0.02;
        }

        self.accumulated_aggression = self.accumulated_aggression.clamp(0.0, MAX_ACCUMULATED);
        self.refresh_stage(profile, delta);

        if self.stage == AggressionStage::Rage && self.time_in_stage > RAGE_COOLDOWN {
            self.accumulated_aggression = params.max_aggression_threshold - 0.1;
            self.stage = AggressionStage::Maximum;
            self.time_in_stage = 0.0;
        }
    }

    /// Копит события и раз в секунду пересчитывает mood
    pub fn update_mood(&mut self, profile: &DriverProfile, delta: f32, race_position: u32, rng: &mut impl Rng) {
        self.mood_timer += delta;
        if self.mood_timer < MOOD_UPDATE_INTERVAL {
            return;
        }
        self.mood_timer = 0.0;

        // Положительная дельта - поднялись в таблице
        let position_delta = match self.mood_position {
            Some(previous) if race_position > 0 => previous as i32 - race_position as i32,
            _ => 0,
        };
        if race_position > 0 {
            self.mood_position = Some(race_position);
        }

        let impact = self.impact_since_mood;
        let overtaken = self.overtaken_since_mood;
        self.impact_since_mood = 0.0;
        self.overtaken_since_mood = false;

        let aggression = profile.aggression.aggression;

        if position_delta > 2 {
            self.mood = Mood::Confident;
        } else if position_delta < -2 {
            self.mood = Mood::Frustrated;
        } else if impact > 0.3 {
            self.mood = if aggression > 0.6 { Mood::Vengeful } else { Mood::Intimidated };
        } else if overtaken && aggression > 0.5 {
            self.mood = Mood::Frustrated;
        }

        if position_delta == 0 && impact < 0.1 && profile.skill.consistency > 0.8 && rng.gen::<f32>() < 0.1 {
            self.mood = Mood::InTheZone;
        }

        if position_delta < -4 {
            self.mood = Mood::Desperate;
        }
    }

    pub fn notify_overtaken(&mut self) {
        self.overtaken_since_mood = true;
    }

    pub fn effective_skill(&self, profile: &DriverProfile) -> f32 {
        let factor = match self.mood {
            Mood::InTheZone => 1.1,
            Mood::Confident => 1.03,
            Mood::Frustrated => 0.97,
            Mood::Desperate => 0.9,
            Mood::Intimidated => 0.95,
            _ => 1.0,
        };
        (profile.skill.skill_level * factor).clamp(0.1, 1.0)
    }

    pub fn effective_aggression(&self, profile: &DriverProfile) -> f32 {
        let factor = match self.mood {
            Mood::Vengeful => 1.3,
            Mood::Frustrated => 1.15,
            Mood::Desperate => 1.4,
            Mood::Intimidated => 0.7,
            Mood::Confident => 1.05,
            _ => 1.0,
        };
        (profile.aggression.aggression * factor).clamp(0.0, 1.0)
    }

    pub fn escalated_aggression(&self, profile: &DriverProfile) -> f32 {
        (self.effective_aggression(profile) + self.stage.bonus()).clamp(0.0, 1.0)
    }

    pub fn has_grudge_against(&self, entity: Entity) -> bool {
        self.contacts.iter().any(|c| c.offender == entity)
    }

    pub fn grudge_intensity(&self, entity: Entity) -> f32 {
        self.contacts
            .iter()
            .find(|c| c.offender == entity)
            .map(|c| {
                let mut intensity = c.severity * (1.0 + c.count as f32 * 0.3);
                if c.seemed_intentional {
                    intensity *= 1.5;
                }
                intensity.clamp(0.0, 1.0)
            })
            .unwrap_or(0.0)
    }

    pub fn enter_battle_mode(&mut self, opponent: Entity) {
        self.battle_opponent = Some(opponent);
        self.accumulated_aggression = (self.accumulated_aggression + 0.1).min(1.0);
    }

    pub fn exit_battle_mode(&mut self) {
        self.battle_opponent = None;
    }

    /// Поведение с учётом personality и стадии эскалации
    pub fn effective_behaviors(&self, profile: &DriverProfile) -> PersonalityBehaviors {
        let mut behaviors = profile.behaviors;

        match profile.personality {
            Personality::Aggressive => {
                behaviors.brake_point_bias = behaviors.brake_point_bias.max(0.3);
                behaviors.side_by_side_willingness = behaviors.side_by_side_willingness.max(0.7);
            }
            Personality::Defensive => {
                behaviors.brake_point_bias = behaviors.brake_point_bias.min(-0.2);
                behaviors.side_by_side_willingness = behaviors.side_by_side_willingness.max(0.6);
            }
            Personality::Rookie => {
                behaviors.brake_point_bias = behaviors.brake_point_bias.min(-0.3);
                behaviors.side_by_side_willingness = behaviors.side_by_side_willingness.min(0.3);
            }
            Personality::Rival => {
                behaviors.brake_point_bias = behaviors.brake_point_bias.max(0.2);
            }
            Personality::Calculated | Personality::Unpredictable | Personality::Veteran => {}
        }

        if self.stage >= AggressionStage::High {
            behaviors.brake_point_bias += 0.1;
        }
        if self.stage == AggressionStage::Rage {
            behaviors.brake_point_bias += 0.3;
        }
        behaviors.brake_point_bias = behaviors.brake_point_bias.clamp(-1.0, 1.0);

        behaviors
    }

    fn stage_for(&self, profile: &DriverProfile) -> AggressionStage {
        let params = &profile.aggression;
        let level = self.accumulated_aggression;

        if level >= 1.0 && params.can_enter_rage {
            AggressionStage::Rage
        } else if level >= params.max_aggression_threshold {
            AggressionStage::Maximum
        } else if level >= params.high_aggression_threshold {
            AggressionStage::High
        } else if level >= ELEVATED_THRESHOLD {
            AggressionStage::Elevated
        } else {
            AggressionStage::Baseline
        }
    }

    fn refresh_stage(&mut self, profile: &DriverProfile, delta: f32) {
        let stage = self.stage_for(profile);
        if stage != self.stage {
            self.stage = stage;
            self.time_in_stage = 0.0;
        } else {
            self.time_in_stage += delta;
        }
    }

    fn cleanup_expired_grudges(&mut self, memory: f32) {
        let clock = self.clock;
        self.contacts.retain(|c| clock - c.timestamp <= memory);

        if let Some(target) = self.grudge_target {
            if !self.contacts.iter().any(|c| c.offender == target) {
                self.grudge_target = None;
            }
        }
    }
}
