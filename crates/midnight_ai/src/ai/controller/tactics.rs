//! Тактика: следование, слипстрим, catch-up, решения об обгоне/защите.

use rand::Rng;

use super::RacerController;
use crate::ai::components::{
    vehicle_ahead, vehicle_behind, CatchUpBehavior, DefenseStrategy, DrivingState,
    OvertakeStrategy, Personality, VehiclePerception,
};
use crate::track::{RacingLine, TrackConditions};

/// Дальше этого машину впереди не «преследуем» (метры)
pub(super) const FOLLOW_DISTANCE: f32 = 20.0;
/// Атакующий сзади ближе этого → можно защищаться
pub(super) const DEFEND_DISTANCE: f32 = 15.0;
/// Радиус проверки свободной стороны для обгона
const PATH_CHECK_DISTANCE: f32 = 25.0;
/// Сколько точек вперёд ищем overtaking zone
const OVERTAKE_ZONE_SCAN: usize = 50;
/// Overtaking zone ближе этого даёт бонус к шансу обгона
const OVERTAKE_ZONE_BONUS_DISTANCE: f32 = 100.0;
/// Gap до лидера/преследователя, после которого включается catch-up (секунды)
const CATCH_UP_GAP: f32 = 5.0;
/// Максимальный бонус слипстрима к target speed
const MAX_SLIPSTREAM_BONUS: f32 = 0.05;
/// Кривизна, выше которой точка считается поворотом
const CORNER_CURVATURE: f32 = 0.01;

impl RacerController {
    /// Обновление тактики (до state machine)
    pub(super) fn update_tactics(&mut self, line: &RacingLine, delta: f32) {
        self.overtake_cooldown = (self.overtake_cooldown - delta).max(0.0);

        // Следование за машиной впереди
        match vehicle_ahead(&self.perceived).filter(|p| p.distance < FOLLOW_DISTANCE) {
            Some(ahead) if self.tactical.following == Some(ahead.vehicle) => {
                self.tactical.time_following += delta;
            }
            Some(ahead) => {
                self.tactical.following = Some(ahead.vehicle);
                self.tactical.time_following = delta;
            }
            None => {
                self.tactical.following = None;
                self.tactical.time_following = 0.0;
            }
        }

        self.tactical.in_slipstream = self.perceived.iter().any(|p| p.is_ahead && p.in_slipstream_range);
        self.tactical.slipstream_bonus = self.slipstream_bonus();
        self.tactical.catch_up_mode = self.determine_catch_up_mode();
        self.tactical.risk_level = self.situational_risk();
        self.tactical.distance_to_overtake_zone = self.distance_to_overtake_zone(line);

        // Износ резины только на повышенной сложности
        if self.difficulty > 1.0 {
            let mut rate = 0.001 * self.difficulty;
            if self.state == DrivingState::CatchingUp {
                rate *= 2.0;
            }
            self.tactical.simulated_tire_wear = (self.tactical.simulated_tire_wear + rate * delta).min(1.0);
        }
    }

    /// Эскалация / mood / battle mode (только с профилем)
    pub(super) fn update_temperament(&mut self, delta: f32, rng: &mut impl Rng) {
        let Some(profile) = self.profile.clone() else {
            return;
        };

        let under_pressure = vehicle_behind(&self.perceived).is_some_and(|p| p.distance < DEFEND_DISTANCE);
        let applying_pressure = vehicle_ahead(&self.perceived).is_some_and(|p| p.distance < DEFEND_DISTANCE);

        self.temperament.update_aggression(
            &profile,
            delta,
            self.standing.position,
            under_pressure,
            applying_pressure,
        );
        self.temperament.update_mood(&profile, delta, self.standing.position, rng);

        // Обида прошла - battle mode тоже
        if let Some(opponent) = self.temperament.battle_opponent() {
            if !self.temperament.has_grudge_against(opponent) {
                self.temperament.exit_battle_mode();
            }
        }
    }

    pub(super) fn determine_catch_up_mode(&self) -> CatchUpBehavior {
        if !self.catch_up_enabled || self.standing.position == 0 {
            return CatchUpBehavior::None;
        }

        let comfortable_lead = self.standing.gap_to_behind.map_or(true, |gap| gap > CATCH_UP_GAP);
        if self.standing.position == 1 && comfortable_lead {
            return CatchUpBehavior::Conservation;
        }

        if self.standing.gap_to_leader > CATCH_UP_GAP {
            let risk_taking = self.profile.as_ref().map_or(0.5, |p| p.aggression.risk_taking);
            return if risk_taking > 0.5 {
                CatchUpBehavior::MaxEffort
            } else {
                CatchUpBehavior::RiskTaking
            };
        }

        if self.tactical.in_slipstream {
            return CatchUpBehavior::DraftingFocus;
        }

        CatchUpBehavior::None
    }

    pub(super) fn situational_risk(&self) -> f32 {
        let mut risk = match &self.profile {
            Some(profile) => profile.aggression.risk_taking * self.temperament.effective_aggression(profile),
            None => 0.5,
        };

        if self.standing.gap_to_leader > 1.5 {
            risk += 0.1;
        }
        if self.standing.position == 1 {
            risk -= 0.1;
        }

        risk.clamp(0.0, 1.0)
    }

    fn distance_to_overtake_zone(&self, line: &RacingLine) -> Option<f32> {
        (1..=OVERTAKE_ZONE_SCAN.min(line.len()))
            .map(|offset| self.line_index + offset)
            .find(|&index| line.point(index).is_overtaking_zone)
            .map(|index| line.forward_distance(self.line_index, index % line.len()))
    }

    /// Максимум по машинам впереди, в чьём слипстриме мы едем
    pub(super) fn slipstream_bonus(&self) -> f32 {
        let range = self.tuning.slipstream_range;
        let cone = self.tuning.slipstream_angle;

        self.perceived
            .iter()
            .filter(|p| p.is_ahead && p.in_slipstream_range)
            .map(|p| {
                let distance_factor = (1.0 - p.distance / range).max(0.0);
                let angle_factor = (1.0 - p.angle.abs() / cone).max(0.0);
                MAX_SLIPSTREAM_BONUS * distance_factor * angle_factor
            })
            .fold(0.0, f32::max)
    }

    /// Надбавка к target speed от catch-up режима (физика машины не меняется)
    pub(super) fn rubber_band_adjustment(&self) -> f32 {
        let adjustment = match self.tactical.catch_up_mode {
            CatchUpBehavior::None => 0.0,
            CatchUpBehavior::RiskTaking => 0.02,
            CatchUpBehavior::MaxEffort => 0.03,
            CatchUpBehavior::DraftingFocus if self.tactical.in_slipstream => self.tactical.slipstream_bonus,
            CatchUpBehavior::DraftingFocus => 0.0,
            CatchUpBehavior::Conservation => -0.02,
        };
        adjustment * self.difficulty
    }

    pub(super) fn should_attempt_overtake(&self, conditions: &TrackConditions, rng: &mut impl Rng) -> bool {
        if self.overtake_cooldown > 0.0 {
            return false;
        }
        let Some(ahead) = vehicle_ahead(&self.perceived) else {
            return false;
        };
        if ahead.distance > FOLLOW_DISTANCE {
            return false;
        }

        let mut chance = match &self.profile {
            Some(profile) => {
                profile.aggression.overtake_aggression * self.temperament.effective_aggression(profile)
            }
            None => self.overtake_threshold,
        };
        chance *= self.difficulty;

        if self.tactical.time_following > 3.0 {
            chance += 0.2;
        }
        if self
            .tactical
            .distance_to_overtake_zone
            .is_some_and(|d| d < OVERTAKE_ZONE_BONUS_DISTANCE)
        {
            chance += 0.15;
        }
        if ahead.speed_difference > 0.0 {
            chance += 0.1;
        }
        if ahead.is_player {
            chance *= 0.8;
        }

        if let Some(profile) = &self.profile {
            chance *= 1.0 + self.temperament.escalated_aggression(profile) * 0.3;
            chance += self.temperament.grudge_intensity(ahead.vehicle) * 0.3;
            if self.temperament.in_battle_with(ahead.vehicle) {
                chance += 0.25;
            }
        }

        chance *= conditions.overtake_penalty();

        rng.gen::<f32>() < chance * 0.05
    }

    pub(super) fn should_defend_position(&self, rng: &mut impl Rng) -> bool {
        let Some(behind) = vehicle_behind(&self.perceived) else {
            return false;
        };
        if behind.distance > DEFEND_DISTANCE {
            return false;
        }

        let mut chance = match &self.profile {
            Some(profile) => {
                profile.aggression.defense_aggression * self.temperament.effective_aggression(profile)
            }
            None => 0.5,
        };

        if behind.is_player && self.profile.as_ref().is_some_and(|p| p.aggression.targets_player) {
            chance += 0.2;
        }

        rng.gen::<f32>() < chance * 0.03
    }

    /// Машина впереди в слипстриме и почти та же скорость
    pub(super) fn should_start_drafting(&self, rng: &mut impl Rng) -> bool {
        let Some(ahead) = vehicle_ahead(&self.perceived) else {
            return false;
        };
        ahead.in_slipstream_range && ahead.speed_difference.abs() < 1.0 && rng.gen::<f32>() < 0.3
    }

    pub(super) fn choose_overtake_strategy(&self, line: &RacingLine, target: &VehiclePerception) -> OvertakeStrategy {
        let current = line.point(self.line_index);

        if current.is_braking_zone && self.tactical.risk_level > 0.6 {
            return OvertakeStrategy::LateBraking;
        }

        if target.in_slipstream_range
            && self
                .tactical
                .distance_to_overtake_zone
                .is_some_and(|d| d < OVERTAKE_ZONE_BONUS_DISTANCE)
        {
            return OvertakeStrategy::SlipstreamPass;
        }

        if target.speed_difference > 0.5 {
            return OvertakeStrategy::BetterExit;
        }

        if let Some(profile) = &self.profile {
            if current.curvature > CORNER_CURVATURE
                && !current.is_apex
                && self.temperament.effective_behaviors(profile).side_by_side_willingness >= 0.7
            {
                return OvertakeStrategy::AroundOutside;
            }

            match profile.personality {
                Personality::Aggressive => return OvertakeStrategy::Pressure,
                Personality::Calculated => return OvertakeStrategy::BetterExit,
                _ => {}
            }
        }

        OvertakeStrategy::Patient
    }

    pub(super) fn choose_defense_strategy(&self, line: &RacingLine) -> DefenseStrategy {
        let current = line.point(self.line_index);
        if current.is_apex || current.is_braking_zone {
            return DefenseStrategy::DefensiveLine;
        }

        match self.profile.as_ref().map(|p| p.personality) {
            Some(Personality::Aggressive) => DefenseStrategy::CoverInside,
            Some(Personality::Calculated) => DefenseStrategy::PaceDefense,
            _ => DefenseStrategy::CoverLine,
        }
    }

    /// Свободна ли сторона для обгона: никого в переднем полушарии ближе 25 м
    pub(super) fn is_overtake_path_clear(&self, on_left: bool) -> bool {
        !self.perceived.iter().any(|p| {
            p.distance < PATH_CHECK_DISTANCE && p.is_on_left == on_left && p.angle.abs() < 90.0
        })
    }
}
