//! Driving state machine: обработчик на каждое состояние + реакция на контакт.

use rand::Rng;

use super::{CollisionReport, RacerController, RacerEvent};
use crate::ai::components::{
    find_perceived, vehicle_ahead, vehicle_behind, CatchUpBehavior, ContactResponse, DrivingState,
    OvertakeStrategy, VehiclePerception,
};
use crate::track::{RacingLine, TrackConditions};

/// Атакующий дальше этого → защита не нужна
const DEFENSE_RELEASE_DISTANCE: f32 = 25.0;
/// Drafting → SlipstreamPass только ближе этого к overtaking zone
const SLIPSTREAM_PASS_ZONE: f32 = 50.0;
/// Преследователь ближе (секунды) → лидер перестаёт экономить
const SLOWDOWN_THREAT_GAP: f32 = 1.5;
/// Потолок following gap после BackOff / Protect (секунды)
const MAX_FOLLOWING_GAP: f32 = 3.0;

impl RacerController {
    pub(super) fn update_state_machine(
        &mut self,
        line: &RacingLine,
        conditions: &TrackConditions,
        delta: f32,
        rng: &mut impl Rng,
    ) {
        match self.state {
            DrivingState::Racing => self.handle_racing(line, conditions, rng),
            DrivingState::Overtaking => self.handle_overtaking(delta),
            DrivingState::Defending => self.handle_defending(),
            DrivingState::Recovering => self.handle_recovering(delta),
            DrivingState::Caution => self.handle_caution(delta),
            DrivingState::CatchingUp => self.handle_catching_up(line, conditions, rng),
            DrivingState::SlowingDown => self.handle_slowing_down(line, rng),
            DrivingState::Waiting | DrivingState::Finished => {}
        }
    }

    fn handle_racing(&mut self, line: &RacingLine, conditions: &TrackConditions, rng: &mut impl Rng) {
        if self.tactical.drafting {
            if self.handle_drafting() {
                return;
            }
        } else if self.should_start_drafting(rng) {
            self.tactical.drafting = true;
            crate::log(&format!("🌬️ {} drafting", self.driver_name()));
        }

        if self.try_begin_overtake(line, conditions, rng) || self.try_begin_defense(line, rng) {
            return;
        }

        match self.tactical.catch_up_mode {
            CatchUpBehavior::RiskTaking | CatchUpBehavior::MaxEffort => self.set_state(DrivingState::CatchingUp),
            CatchUpBehavior::Conservation => self.set_state(DrivingState::SlowingDown),
            CatchUpBehavior::None | CatchUpBehavior::DraftingFocus => {}
        }
    }

    /// Drafting sub-mode. true → ушли в Overtaking (SlipstreamPass)
    fn handle_drafting(&mut self) -> bool {
        let Some(lead) = vehicle_ahead(&self.perceived).filter(|p| p.in_slipstream_range).cloned() else {
            self.tactical.drafting = false;
            return false;
        };

        let near_zone = self
            .tactical
            .distance_to_overtake_zone
            .is_some_and(|d| d < SLIPSTREAM_PASS_ZONE);

        if near_zone && lead.speed_difference > 1.0 && self.overtake_cooldown <= 0.0 {
            return self.begin_overtake(&lead, OvertakeStrategy::SlipstreamPass);
        }

        false
    }

    fn handle_overtaking(&mut self, delta: f32) {
        self.overtake_timer += delta;

        let Some(target) = self.tactical.tactical_target else {
            self.set_state(DrivingState::Racing);
            return;
        };

        match find_perceived(&self.perceived, target).map(|p| p.is_ahead) {
            None => {
                crate::log(&format!("👻 {} lost overtake target {:?}", self.driver_name(), target));
                self.set_state(DrivingState::Racing);
                return;
            }
            Some(false) => {
                crate::log(&format!(
                    "✅ {} overtook {:?} ({:?})",
                    self.driver_name(),
                    target,
                    self.tactical.overtake_strategy
                ));
                self.outbox.push(RacerEvent::OvertakeCompleted {
                    overtaken: target,
                    strategy: self.tactical.overtake_strategy,
                });
                self.set_state(DrivingState::Racing);
                return;
            }
            Some(true) => {}
        }

        let max_time = self
            .profile
            .as_ref()
            .map_or(self.tuning.max_overtake_time, |p| p.aggression.overtake_patience * 2.0);

        if self.overtake_timer > max_time {
            crate::log(&format!("⏱️ {} overtake timed out", self.driver_name()));
            self.set_state(DrivingState::Racing);
            return;
        }

        // Сторона закрылась → пробуем другую, обе закрыты → отбой
        if !self.is_overtake_path_clear(self.overtake_on_left) {
            if self.is_overtake_path_clear(!self.overtake_on_left) {
                self.overtake_on_left = !self.overtake_on_left;
            } else {
                crate::log(&format!("🚧 {} overtake aborted: both sides blocked", self.driver_name()));
                self.set_state(DrivingState::Racing);
            }
        }
    }

    fn handle_defending(&mut self) {
        let attacker = self
            .tactical
            .tactical_target
            .and_then(|target| find_perceived(&self.perceived, target).cloned());

        let Some(attacker) = attacker else {
            self.set_state(DrivingState::Racing);
            return;
        };

        // Атакующий прошёл: нос впереди и в переднем конусе
        if attacker.is_ahead && attacker.angle.abs() < 60.0 {
            crate::log(&format!("😤 {} was overtaken by {:?}", self.driver_name(), attacker.vehicle));
            self.outbox.push(RacerEvent::WasOvertaken { by: attacker.vehicle });
            self.temperament.notify_overtaken();
            self.set_state(DrivingState::Racing);
            return;
        }

        if attacker.distance > DEFENSE_RELEASE_DISTANCE {
            self.set_state(DrivingState::Racing);
            return;
        }

        let max_time = self
            .profile
            .as_ref()
            .map_or(10.0, |p| 5.0 + p.aggression.defense_aggression * 10.0);

        if self.time_in_state > max_time {
            self.set_state(DrivingState::Racing);
        }
    }

    fn handle_recovering(&mut self, delta: f32) {
        self.recovery_timer -= delta;

        let on_line = self
            .distance_to_line
            .is_some_and(|d| d <= self.tuning.recovery_rejoin_distance);

        if self.recovery_timer <= 0.0 && on_line {
            self.pid.reset();
            self.set_state(DrivingState::Racing);
        }
    }

    fn handle_caution(&mut self, delta: f32) {
        self.caution_timer -= delta;
        if self.caution_timer <= 0.0 {
            self.caution_timer = 0.0;
            self.set_state(DrivingState::Racing);
        }
    }

    fn handle_catching_up(&mut self, line: &RacingLine, conditions: &TrackConditions, rng: &mut impl Rng) {
        if !matches!(
            self.tactical.catch_up_mode,
            CatchUpBehavior::RiskTaking | CatchUpBehavior::MaxEffort
        ) {
            self.set_state(DrivingState::Racing);
            return;
        }

        self.try_begin_overtake(line, conditions, rng);
    }

    fn handle_slowing_down(&mut self, line: &RacingLine, rng: &mut impl Rng) {
        let threatened = self
            .standing
            .gap_to_behind
            .is_some_and(|gap| gap < SLOWDOWN_THREAT_GAP);

        if self.tactical.catch_up_mode != CatchUpBehavior::Conservation || threatened {
            self.set_state(DrivingState::Racing);
            return;
        }

        self.try_begin_defense(line, rng);
    }

    fn try_begin_overtake(&mut self, line: &RacingLine, conditions: &TrackConditions, rng: &mut impl Rng) -> bool {
        if !self.should_attempt_overtake(conditions, rng) {
            return false;
        }
        let Some(target) = vehicle_ahead(&self.perceived).cloned() else {
            return false;
        };

        let strategy = self.choose_overtake_strategy(line, &target);
        self.begin_overtake(&target, strategy)
    }

    /// Выбор стороны + переход в Overtaking. false → обе стороны заняты
    fn begin_overtake(&mut self, target: &VehiclePerception, strategy: OvertakeStrategy) -> bool {
        let left_clear = self.is_overtake_path_clear(true);
        let right_clear = self.is_overtake_path_clear(false);
        if !left_clear && !right_clear {
            return false;
        }

        self.overtake_on_left = left_clear;
        self.overtake_timer = 0.0;
        self.tactical.overtake_strategy = strategy;
        self.tactical.tactical_target = Some(target.vehicle);

        crate::log(&format!(
            "⚔️ {} attacks {:?} on the {} ({:?})",
            self.driver_name(),
            target.vehicle,
            if left_clear { "left" } else { "right" },
            strategy
        ));
        self.set_state(DrivingState::Overtaking);
        true
    }

    fn try_begin_defense(&mut self, line: &RacingLine, rng: &mut impl Rng) -> bool {
        if !self.should_defend_position(rng) {
            return false;
        }
        let Some(attacker) = vehicle_behind(&self.perceived).map(|p| p.vehicle) else {
            return false;
        };

        self.tactical.defense_strategy = self.choose_defense_strategy(line);
        self.tactical.tactical_target = Some(attacker);

        crate::log(&format!(
            "🛡️ {} defends against {:?} ({:?})",
            self.driver_name(),
            attacker,
            self.tactical.defense_strategy
        ));
        self.set_state(DrivingState::Defending);
        true
    }

    /// Реакция на контакт по профилю водителя
    pub(super) fn handle_contact_response(&mut self, response: ContactResponse, report: &CollisionReport) {
        let offender = report.other;

        match response {
            ContactResponse::Ignore => {}
            ContactResponse::Report => {
                crate::log_info(&format!("📝 {} reports contact from {:?}", self.driver_name(), offender));
            }
            ContactResponse::BackOff => {
                self.min_following_gap = (self.min_following_gap + 0.5).min(MAX_FOLLOWING_GAP);
                if self.state == DrivingState::Overtaking && self.tactical.tactical_target == Some(offender) {
                    self.set_state(DrivingState::Racing);
                }
            }
            ContactResponse::Retaliate => {
                self.temperament.enter_battle_mode(offender);

                let offender_ahead = find_perceived(&self.perceived, offender)
                    .filter(|p| p.is_ahead)
                    .cloned();
                if let Some(target) = offender_ahead {
                    if self.state != DrivingState::Overtaking {
                        self.begin_overtake(&target, OvertakeStrategy::Pressure);
                    }
                }
            }
            ContactResponse::Protect => {
                self.min_following_gap = (self.min_following_gap + 1.0).min(MAX_FOLLOWING_GAP);
                self.tactical.catch_up_mode = match self.tactical.catch_up_mode {
                    CatchUpBehavior::MaxEffort => CatchUpBehavior::RiskTaking,
                    CatchUpBehavior::RiskTaking => CatchUpBehavior::None,
                    other => other,
                };
            }
            ContactResponse::Mirror => {
                if report.other_velocity.length() > report.my_velocity.length() * 1.1 {
                    self.temperament.enter_battle_mode(offender);
                }
            }
        }
    }
}
