//! Расчёт target speed и SteeringOutput для каждого состояния.
//!
//! Все ветки сходятся в `drive_towards`: PID по ошибке курса +
//! газ/тормоз по ошибке скорости. Поверх - шум, ошибки профиля и
//! модификаторы агрессии, потом clamp всех каналов.

use bevy::prelude::*;
use rand::Rng;

use super::RacerController;
use crate::ai::components::{
    find_perceived, vehicle_ahead, vehicle_behind, AggressionStage, DefenseStrategy, DriverProfile, DrivingState,
    OvertakeStrategy, SteeringOutput, VehicleSnapshot,
};
use crate::track::{RacingLine, TrackConditions};

/// Машины впереди ближе этого отталкивают точку прицеливания (метры)
const AVOIDANCE_DISTANCE: f32 = 15.0;
/// Максимальный сдвиг от одной машины (метры)
const AVOIDANCE_MAX_OFFSET: f32 = 3.0;
/// Запас к braking distance
const BRAKING_MARGIN: f32 = 1.2;
/// Дистанция drafting'а за lead машиной (метры)
const DRAFT_DISTANCE: f32 = 10.0;
/// Машина впереди считается «в нашей полосе» при боковом смещении меньше этого
const LANE_HALF_WIDTH: f32 = 2.5;
/// Машина ближе этого - колесо в колесо
const SIDE_BY_SIDE_DISTANCE: f32 = 5.0;

/// Равномерно в -1..1
fn symmetric(rng: &mut impl Rng) -> f32 {
    rng.gen::<f32>() * 2.0 - 1.0
}

/// Проекция на горизонталь (Y - вверх)
fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z).normalize_or_zero()
}

impl RacerController {
    pub(super) fn calculate_target_speed(&self, line: &RacingLine, conditions: &TrackConditions) -> f32 {
        let current = line.point(self.line_index);
        let ahead = line.point_ahead(self.line_index, self.tuning.speed_look_ahead);

        let mut speed = current.target_speed.min(ahead.target_speed);
        speed *= 0.8 + 0.2 * self.difficulty;

        if let Some(profile) = &self.profile {
            speed *= profile.speed.base_speed_percent;
            if current.is_apex {
                speed *= profile.speed.corner_speed_multiplier;
            } else if !current.is_braking_zone {
                speed *= profile.speed.straight_speed_multiplier;
            }
        }

        let wear = self.tactical.simulated_tire_wear;
        if wear > 0.3 {
            speed *= 1.0 - (wear - 0.3) * 0.1;
        }

        speed *= current.grip_level;
        speed *= conditions.grip;

        let skill = self.profile.as_ref().map(|p| self.temperament.effective_skill(p));
        speed *= 1.0 - conditions.visibility_caution(skill);

        if self.catch_up_enabled {
            speed *= 1.0 + self.rubber_band_adjustment();
        }
        if self.tactical.in_slipstream {
            speed *= 1.0 + self.tactical.slipstream_bonus;
        }
        if self.state == DrivingState::Caution {
            speed *= self.tuning.caution_speed_factor;
        }

        speed.max(0.0)
    }

    /// v² − v_t² / 2a; замедление зависит от навыка, сцепления и погоды
    pub(super) fn braking_distance(&self, current_speed: f32, target_speed: f32, conditions: &TrackConditions) -> f32 {
        if current_speed <= target_speed {
            return 0.0;
        }

        let skill = self.profile.as_ref().map(|p| self.temperament.effective_skill(p));

        let mut decel = self.tuning.braking_decel;
        if let (Some(profile), Some(skill)) = (&self.profile, skill) {
            decel *= 0.8 + 0.4 * profile.skill.braking_accuracy * skill;
        }
        decel *= conditions.grip.max(0.1);

        if conditions.hazardous {
            decel /= match skill {
                Some(skill) => 1.3 + (1.1 - 1.3) * skill,
                None => 1.2,
            };
        }

        (current_speed * current_speed - target_speed * target_speed) / (2.0 * decel)
    }

    pub(super) fn calculate_steering(
        &mut self,
        line: &RacingLine,
        me: &VehicleSnapshot,
        conditions: &TrackConditions,
        delta: f32,
        rng: &mut impl Rng,
    ) -> SteeringOutput {
        let mut output = match self.state {
            DrivingState::Racing if self.tactical.drafting => self.drafting_steering(line, me, conditions, delta, rng),
            DrivingState::Racing | DrivingState::CatchingUp | DrivingState::SlowingDown => {
                self.racing_line_steering(line, me, conditions, delta, rng)
            }
            DrivingState::Overtaking => self.overtake_steering(line, me, conditions, delta, rng),
            DrivingState::Defending => self.defense_steering(line, me, conditions, delta, rng),
            DrivingState::Recovering => self.recovery_steering(line, me),
            DrivingState::Caution => {
                let mut output = self.racing_line_steering(line, me, conditions, delta, rng);
                output.nos = false;
                output
            }
            DrivingState::Waiting | DrivingState::Finished => SteeringOutput::full_brake(),
        };

        output.steering = self.add_steering_noise(output.steering, rng);

        if let Some(profile) = self.profile.clone() {
            self.apply_profile_modifiers(&profile, &mut output, rng);
            self.apply_aggression_modifiers(&profile, &mut output, rng);
        }

        output.clamp_channels();
        output
    }

    /// Точка прицеливания: look-ahead по линии + avoidance + боковой сдвиг
    ///
    /// `lateral_offset` в метрах, положительный - вправо от направления линии.
    fn line_target(&self, line: &RacingLine, me: &VehicleSnapshot, lateral_offset: f32) -> Vec3 {
        let ahead = line.point_ahead(self.line_index, self.tuning.steering_look_ahead);
        let line_right = flatten(ahead.direction).cross(Vec3::Y);
        ahead.position + line_right * lateral_offset + self.avoidance_offset(me)
    }

    /// Отталкивание от машин впереди: квадратичный спад, до 3 м от каждой
    fn avoidance_offset(&self, me: &VehicleSnapshot) -> Vec3 {
        let right = flatten(me.forward).cross(Vec3::Y);

        self.perceived
            .iter()
            .filter(|p| p.is_ahead && p.distance < AVOIDANCE_DISTANCE)
            .filter(|p| !(self.tactical.drafting && self.tactical.following == Some(p.vehicle)))
            .map(|p| {
                let falloff = 1.0 - p.distance / AVOIDANCE_DISTANCE;
                let away = if p.is_on_left { right } else { -right };
                away * falloff * falloff * AVOIDANCE_MAX_OFFSET
            })
            .sum()
    }

    /// Общая часть всех веток: руль на `aim`, газ/тормоз на target speed
    fn drive_towards(
        &mut self,
        line: &RacingLine,
        me: &VehicleSnapshot,
        conditions: &TrackConditions,
        aim: Vec3,
        delta: f32,
        rng: &mut impl Rng,
    ) -> SteeringOutput {
        let mut output = SteeringOutput {
            target_point: aim,
            ..Default::default()
        };

        let to_target = flatten(aim - me.position);
        let forward = flatten(me.forward);
        let right = forward.cross(Vec3::Y);

        let dot_right = right.dot(to_target);
        let dot_forward = forward.dot(to_target).max(0.1);
        let heading_error = dot_right.atan2(dot_forward);
        output.steering = self.pid.update(heading_error, delta);

        let speed_error = self.target_speed - self.current_speed;
        if speed_error > 0.5 {
            output.throttle = 1.0;
        } else if speed_error < -1.0 {
            output.brake = (-speed_error / 5.0).clamp(0.0, 1.0);
        } else {
            output.throttle = (speed_error / 2.0 + 0.5).clamp(0.0, 1.0);
        }

        // Торможение заранее перед braking zone
        let ahead_index = line.index_ahead(self.line_index, self.tuning.speed_look_ahead);
        let ahead = line.point(ahead_index);
        let required_speed = ahead.target_speed * conditions.grip;
        if ahead.is_braking_zone && self.current_speed > required_speed {
            let braking_distance = self.braking_distance(self.current_speed, required_speed, conditions);
            let distance = line.forward_distance(self.line_index, ahead_index).max(0.1);
            if distance <= braking_distance * BRAKING_MARGIN {
                output.throttle = 0.0;
                output.brake = (braking_distance / distance).clamp(0.3, 1.0);
            }
        }

        self.hold_following_gap(&mut output);

        if let Some(profile) = &self.profile {
            if self.state != DrivingState::Caution
                && ahead.is_acceleration_zone
                && !ahead.is_braking_zone
                && rng.gen::<f32>() < profile.speed.nos_usage_frequency * 0.01
            {
                output.nos = true;
            }
        }

        output.desired_gear = line.point_ahead(self.line_index, self.tuning.steering_look_ahead).optimal_gear;
        output.confidence = 1.0 - self.tactical.simulated_tire_wear * 0.3;
        output
    }

    /// Не наезжаем на машину в своей полосе ближе min_following_gap
    fn hold_following_gap(&self, output: &mut SteeringOutput) {
        if self.tactical.drafting {
            return;
        }

        let overtake_target = match self.state {
            DrivingState::Overtaking => self.tactical.tactical_target,
            _ => None,
        };

        let Some(lead) = vehicle_ahead(&self.perceived).filter(|p| {
            Some(p.vehicle) != overtake_target
                && (p.distance * p.angle.to_radians().sin()).abs() < LANE_HALF_WIDTH
        }) else {
            return;
        };

        let time_gap = lead.distance / self.current_speed.max(1.0);
        if time_gap < self.min_following_gap && lead.speed_difference > 0.0 {
            output.throttle = output.throttle.min(0.2);
            if time_gap < self.min_following_gap * 0.5 {
                output.throttle = 0.0;
                output.brake = output.brake.max((lead.speed_difference / 5.0).clamp(0.2, 1.0));
            }
        }
    }

    fn racing_line_steering(
        &mut self,
        line: &RacingLine,
        me: &VehicleSnapshot,
        conditions: &TrackConditions,
        delta: f32,
        rng: &mut impl Rng,
    ) -> SteeringOutput {
        let aim = self.line_target(line, me, 0.0);
        self.drive_towards(line, me, conditions, aim, delta, rng)
    }

    fn overtake_steering(
        &mut self,
        line: &RacingLine,
        me: &VehicleSnapshot,
        conditions: &TrackConditions,
        delta: f32,
        rng: &mut impl Rng,
    ) -> SteeringOutput {
        let strategy = self.tactical.overtake_strategy;
        let current = line.point(self.line_index);

        let fraction = match strategy {
            OvertakeStrategy::Patient => 0.3,
            OvertakeStrategy::LateBraking => 0.4,
            OvertakeStrategy::BetterExit => 0.25,
            OvertakeStrategy::AroundOutside => 0.45,
            OvertakeStrategy::SlipstreamPass => 0.35,
            OvertakeStrategy::Pressure => 0.2,
        };
        let side = if self.overtake_on_left { -1.0 } else { 1.0 };
        let offset = side * fraction * current.track_width;

        let aim = self.line_target(line, me, offset);
        let mut output = self.drive_towards(line, me, conditions, aim, delta, rng);

        match strategy {
            OvertakeStrategy::LateBraking => {
                output.brake *= 1.0 - self.tactical.risk_level * 0.3;
            }
            OvertakeStrategy::BetterExit if current.is_acceleration_zone => {
                output.throttle += 0.15;
            }
            OvertakeStrategy::SlipstreamPass => {
                output.throttle = 1.0;
            }
            _ => {}
        }

        output.throttle = (output.throttle + 0.1).min(1.0);

        let aggressive = self
            .profile
            .as_ref()
            .is_some_and(|p| p.aggression.overtake_aggression > 0.7);
        if aggressive && rng.gen::<f32>() < 0.1 {
            output.nos = true;
        }

        output
    }

    fn defense_steering(
        &mut self,
        line: &RacingLine,
        me: &VehicleSnapshot,
        conditions: &TrackConditions,
        delta: f32,
        rng: &mut impl Rng,
    ) -> SteeringOutput {
        let current = line.point(self.line_index);
        let attacker_on_left = self
            .tactical
            .tactical_target
            .and_then(|target| find_perceived(&self.perceived, target))
            .or_else(|| vehicle_behind(&self.perceived))
            .map(|p| p.is_on_left);

        let toward_attacker = match attacker_on_left {
            Some(true) => -1.0,
            Some(false) => 1.0,
            None => 0.0,
        };

        let offset = match self.tactical.defense_strategy {
            DefenseStrategy::CoverInside => toward_attacker * 0.3 * current.track_width,
            DefenseStrategy::DefensiveLine if current.is_apex || current.is_braking_zone => {
                toward_attacker * 0.2 * current.track_width
            }
            _ => 0.0,
        };

        let aim = self.line_target(line, me, offset);
        let mut output = self.drive_towards(line, me, conditions, aim, delta, rng);

        if self.tactical.defense_strategy == DefenseStrategy::PaceDefense {
            output.throttle = (output.throttle + 0.1).min(1.0);
        }

        output
    }

    /// Возврат на линию: без PID, пропорционально боковой ошибке
    fn recovery_steering(&self, line: &RacingLine, me: &VehicleSnapshot) -> SteeringOutput {
        let closest = line.closest_point_near(me.position, self.line_index);
        let aim_index = line.index_ahead(closest, self.tuning.steering_look_ahead * 0.5);
        let aim = line.point(aim_index);

        let to_target = flatten(aim.position - me.position);
        let right = flatten(me.forward).cross(Vec3::Y);

        let mut output = SteeringOutput {
            steering: (2.0 * right.dot(to_target)).clamp(-1.0, 1.0),
            target_point: aim.position,
            desired_gear: aim.optimal_gear,
            confidence: 0.5,
            ..Default::default()
        };

        if self.current_speed > line.point(closest).target_speed * 0.5 {
            output.brake = 0.3;
        } else {
            output.throttle = 0.4;
        }

        output
    }

    /// Drafting: держимся в 10 м за lead машиной
    fn drafting_steering(
        &mut self,
        line: &RacingLine,
        me: &VehicleSnapshot,
        conditions: &TrackConditions,
        delta: f32,
        rng: &mut impl Rng,
    ) -> SteeringOutput {
        let Some(lead) = vehicle_ahead(&self.perceived).filter(|p| p.in_slipstream_range).cloned() else {
            return self.racing_line_steering(line, me, conditions, delta, rng);
        };

        // Рулим по racing line; точка за lead машиной только для target_point
        // (на дистанции < DRAFT_DISTANCE она уже позади нас)
        let mut output = self.racing_line_steering(line, me, conditions, delta, rng);
        output.target_point = lead.other_position - lead.other_forward * DRAFT_DISTANCE;

        if lead.distance > DRAFT_DISTANCE {
            output.throttle = 1.0;
            output.brake = 0.0;
        } else if lead.speed_difference > 0.0 {
            output.throttle = 0.0;
            output.brake = (lead.speed_difference / 5.0).clamp(0.1, 1.0);
        }

        output
    }

    /// Шум руля: база personality × (1 − consistency) / сложность
    pub(super) fn add_steering_noise(&self, steering: f32, rng: &mut impl Rng) -> f32 {
        let Some(profile) = &self.profile else {
            return steering;
        };

        let noise = profile.steering_noise() * (1.0 - profile.skill.consistency) / self.difficulty;
        steering + symmetric(rng) * noise
    }

    /// Неточность линии/торможения + случайные ошибки
    fn apply_profile_modifiers(&self, profile: &DriverProfile, output: &mut SteeringOutput, rng: &mut impl Rng) {
        let line_inaccuracy = (1.0 - profile.skill.line_accuracy) / self.difficulty;
        output.steering += symmetric(rng) * line_inaccuracy * 0.1;

        let brake_inaccuracy = 1.0 - profile.skill.braking_accuracy;
        output.brake *= 1.0 + symmetric(rng) * brake_inaccuracy * 0.15;

        let mistake_chance = profile.skill.mistake_frequency * 0.005 / self.difficulty;
        if rng.gen::<f32>() < mistake_chance {
            if rng.gen_bool(0.5) {
                // Недогаз
                output.throttle *= 0.3 + 0.4 * rng.gen::<f32>();
            } else {
                output.steering += symmetric(rng) * 0.2;
            }
            output.confidence *= 0.7;
        }
    }

    fn apply_aggression_modifiers(&self, profile: &DriverProfile, output: &mut SteeringOutput, rng: &mut impl Rng) {
        let escalated = self.temperament.escalated_aggression(profile);

        output.throttle = (output.throttle * (1.0 + escalated * 0.1)).min(1.0);
        if escalated > 0.7 {
            output.brake *= 1.0 - (escalated - 0.7) * 0.3;
        }

        let behaviors = self.temperament.effective_behaviors(profile);
        output.brake *= 1.0 - behaviors.brake_point_bias * 0.2;

        if self.perceived.iter().any(|p| p.distance < SIDE_BY_SIDE_DISTANCE) {
            output.confidence *= behaviors.side_by_side_willingness;
        }

        if self.temperament.stage() == AggressionStage::Rage {
            if rng.gen::<f32>() < 0.05 {
                output.steering += symmetric(rng) * 0.15;
            }
            if rng.gen::<f32>() < 0.03 {
                output.brake *= 0.7 + 0.6 * rng.gen::<f32>();
            }
        }
    }
}
