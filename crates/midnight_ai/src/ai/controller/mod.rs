//! RacerController - per-vehicle AI водитель
//!
//! Архитектура:
//! - Component на отдельной entity, управляет машиной через `possess(Entity)`
//! - Racing line и DriverProfile - shared `Arc` (никогда не мутируются контроллером)
//! - Мутабельное состояние водителя (эскалация, mood, обиды) - в Temperament
//! - Весь tick - чистый метод без ECS доступа: snapshot'ы машин на входе,
//!   SteeringOutput на выходе. ECS обвязка - в ai::systems.
//!
//! Порядок tick'а:
//! perception → progress → tactics → temperament → state machine →
//! target speed → steering → time_in_state

use std::sync::Arc;

use bevy::prelude::*;
use rand::Rng;

use super::components::{
    perceive, CatchUpBehavior, DefenseStrategy, DriverProfile, DrivingState, OvertakeStrategy,
    PerceptionParams, RacerTuning, SteeringOutput, SteeringPid, Temperament, VehiclePerception,
    VehicleSnapshot,
};
use crate::track::{RacingLine, TrackConditions};

mod handlers;
mod steering;
mod tactics;


/// Ровно 0.5..=1.5, как у сложности гонки
pub const MIN_DIFFICULTY: f32 = 0.5;
pub const MAX_DIFFICULTY: f32 = 1.5;

/// Удар сильнее этого (m/s вдоль нормали) → Recovering
pub const RECOVERY_IMPACT_SPEED: f32 = 5.0;

/// Нормализация impact speed в severity 0..1 (m/s)
const SEVERITY_NORMALIZATION: f32 = 20.0;

/// Тактическое состояние (видно снаружи через tactical_data())
#[derive(Debug, Clone, PartialEq)]
pub struct TacticalData {
    pub overtake_strategy: OvertakeStrategy,
    pub defense_strategy: DefenseStrategy,
    pub catch_up_mode: CatchUpBehavior,
    /// Цель обгона / атакующий при защите
    pub tactical_target: Option<Entity>,
    /// Машина впереди, за которой едем (отдельно от tactical_target)
    pub following: Option<Entity>,
    pub time_following: f32,
    /// До ближайшей overtaking zone впереди (метры), None если в окне нет
    pub distance_to_overtake_zone: Option<f32>,
    /// Текущая готовность рисковать 0..1
    pub risk_level: f32,
    /// 0..1, растёт только на сложности > 1
    pub simulated_tire_wear: f32,
    pub in_slipstream: bool,
    /// Бонус к target speed от слипстрима (≤ 0.05)
    pub slipstream_bonus: f32,
    /// Drafting sub-mode внутри Racing
    pub drafting: bool,
}

impl Default for TacticalData {
    fn default() -> Self {
        Self {
            overtake_strategy: OvertakeStrategy::default(),
            defense_strategy: DefenseStrategy::default(),
            catch_up_mode: CatchUpBehavior::None,
            tactical_target: None,
            following: None,
            time_following: 0.0,
            distance_to_overtake_zone: None,
            risk_level: 0.5,
            simulated_tire_wear: 0.0,
            in_slipstream: false,
            slipstream_bonus: 0.0,
            drafting: false,
        }
    }
}

/// Позиция в гонке (пушится race director'ом)
///
/// Gap'ы в секундах. `position == 0` - standings ещё не посчитаны.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RaceStanding {
    pub position: u32,
    pub total: u32,
    pub gap_to_leader: f32,
    /// None - впереди никого (лидер)
    pub gap_to_ahead: Option<f32>,
    /// None - сзади никого
    pub gap_to_behind: Option<f32>,
}

/// Данные контакта для notify_collision
///
/// Скорости - до удара. Нормаль направлена от other к нам.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionReport {
    pub other: Entity,
    pub other_is_player: bool,
    pub my_position: Vec3,
    pub my_velocity: Vec3,
    pub other_position: Vec3,
    pub other_velocity: Vec3,
    pub impact_normal: Vec3,
}

impl CollisionReport {
    /// Скорость удара вдоль нормали (относительная, m/s)
    pub fn impact_speed(&self) -> f32 {
        (self.my_velocity - self.other_velocity).dot(self.impact_normal).abs()
    }

    /// 0..1
    pub fn severity(&self) -> f32 {
        (self.impact_speed() / SEVERITY_NORMALIZATION).clamp(0.0, 1.0)
    }
}

/// Решения контроллера для внешнего мира (drain'ятся в Bevy events)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RacerEvent {
    StateChanged { from: DrivingState, to: DrivingState },
    OvertakeCompleted { overtaken: Entity, strategy: OvertakeStrategy },
    WasOvertaken { by: Entity },
}

#[derive(Component, Debug, Clone)]
pub struct RacerController {
    tuning: RacerTuning,
    profile: Option<Arc<DriverProfile>>,
    racing_line: Option<Arc<RacingLine>>,
    pawn: Option<Entity>,

    difficulty: f32,
    catch_up_enabled: bool,
    overtake_threshold: f32,
    /// Секунды; растёт от BackOff/Protect
    min_following_gap: f32,

    state: DrivingState,
    time_in_state: f32,
    steering: SteeringOutput,
    target_speed: f32,
    current_speed: f32,
    pid: SteeringPid,

    perceived: Vec<VehiclePerception>,
    tactical: TacticalData,
    temperament: Temperament,
    standing: RaceStanding,

    line_index: usize,
    /// false до первого full-scan поиска ближайшей точки
    line_index_valid: bool,
    /// Стартовали на второй половине круга (стартовая решётка): первый
    /// переход через старт - это старт гонки, а не круг
    behind_start_line: bool,
    laps_completed: u32,
    line_progress: f32,
    distance_to_line: Option<f32>,

    overtake_timer: f32,
    overtake_on_left: bool,
    overtake_cooldown: f32,
    recovery_timer: f32,
    caution_timer: f32,

    outbox: Vec<RacerEvent>,
}

impl Default for RacerController {
    fn default() -> Self {
        Self::new(RacerTuning::default())
    }
}

impl RacerController {
    pub fn new(tuning: RacerTuning) -> Self {
        let pid = SteeringPid::new(tuning.steering_p_gain, tuning.steering_i_gain, tuning.steering_d_gain);

        Self {
            overtake_threshold: tuning.overtake_threshold,
            min_following_gap: tuning.min_following_gap,
            target_speed: tuning.default_target_speed,
            tuning,
            profile: None,
            racing_line: None,
            pawn: None,
            difficulty: 1.0,
            catch_up_enabled: true,
            state: DrivingState::Waiting,
            time_in_state: 0.0,
            steering: SteeringOutput::default(),
            current_speed: 0.0,
            pid,
            perceived: Vec::new(),
            tactical: TacticalData::default(),
            temperament: Temperament::default(),
            standing: RaceStanding::default(),
            line_index: 0,
            line_index_valid: false,
            behind_start_line: false,
            laps_completed: 0,
            line_progress: 0.0,
            distance_to_line: None,
            overtake_timer: 0.0,
            overtake_on_left: false,
            overtake_cooldown: 0.0,
            recovery_timer: 0.0,
            caution_timer: 0.0,
            outbox: Vec::new(),
        }
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Профиль определяет overtake threshold и following gap; temperament сбрасывается
    pub fn set_driver_profile(&mut self, profile: Option<Arc<DriverProfile>>) {
        match &profile {
            Some(p) => {
                self.overtake_threshold = p.aggression.overtake_aggression;
                self.min_following_gap = p.min_following_gap();
            }
            None => {
                self.overtake_threshold = self.tuning.overtake_threshold;
                self.min_following_gap = self.tuning.min_following_gap;
            }
        }
        self.profile = profile;
        self.temperament.reset();
    }

    pub fn set_difficulty_multiplier(&mut self, multiplier: f32) {
        self.difficulty = multiplier.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY);
    }

    pub fn set_rubber_banding_enabled(&mut self, enabled: bool) {
        self.catch_up_enabled = enabled;
    }

    pub fn set_racing_line(&mut self, line: Arc<RacingLine>) {
        self.racing_line = Some(line);
        self.line_index = 0;
        self.line_index_valid = false;
        self.behind_start_line = false;
        self.line_progress = 0.0;
        self.distance_to_line = None;
    }

    pub fn set_overtake_aggression(&mut self, aggression: f32) {
        self.overtake_threshold = aggression.clamp(0.0, 1.0);
    }

    pub fn possess(&mut self, vehicle: Entity) {
        self.pawn = Some(vehicle);
    }

    pub fn unpossess(&mut self) {
        self.pawn = None;
    }

    // ========================================================================
    // Race control
    // ========================================================================

    pub fn start_racing(&mut self) {
        self.tactical = TacticalData::default();
        self.pid.reset();
        self.overtake_timer = 0.0;
        self.overtake_cooldown = 0.0;
        self.recovery_timer = 0.0;
        self.caution_timer = 0.0;
        self.steering = SteeringOutput::default();
        self.set_state(DrivingState::Racing);
    }

    /// Finished + полный тормоз; дальше tick не выдаёт output
    pub fn stop_racing(&mut self) {
        self.set_state(DrivingState::Finished);
        self.steering = SteeringOutput::full_brake();
    }

    /// Немедленная перезапись state (без промежуточных переходов)
    pub fn force_state(&mut self, state: DrivingState) {
        if state == DrivingState::Finished {
            self.stop_racing();
        } else {
            self.set_state(state);
        }
    }

    /// Контакт с другой машиной (из VehicleCollision)
    pub fn notify_collision(&mut self, report: &CollisionReport) {
        if !matches!(
            self.state,
            DrivingState::Racing
                | DrivingState::Overtaking
                | DrivingState::Defending
                | DrivingState::CatchingUp
                | DrivingState::SlowingDown
        ) {
            return;
        }

        let impact_speed = report.impact_speed();
        let severity = report.severity();

        if let Some(profile) = self.profile.clone() {
            let other_speed = report.other_velocity.length();
            let toward_me = (report.my_position - report.other_position).normalize_or_zero();
            let seemed_intentional =
                report.other_velocity.normalize_or_zero().dot(toward_me) > 0.5 && other_speed > 5.0;

            self.temperament.record_contact(
                &profile,
                report.other,
                severity,
                report.other_is_player,
                seemed_intentional,
            );

            let response = profile.contact_response(severity);
            self.handle_contact_response(response, report);
        }

        if impact_speed > RECOVERY_IMPACT_SPEED {
            crate::log(&format!(
                "💥 {} impact {:.1} m/s from {:?} → Recovering",
                self.driver_name(),
                impact_speed,
                report.other
            ));
            self.recovery_timer = 1.0 + (3.0 - 1.0) * severity;
            self.set_state(DrivingState::Recovering);
        }
    }

    /// Вылет за пределы трассы
    pub fn notify_off_track(&mut self) {
        if !self.state.is_active() || self.state == DrivingState::Recovering {
            return;
        }

        self.recovery_timer = match &self.profile {
            Some(profile) => 2.0 * (2.0 - profile.skill.recovery_skill),
            None => 2.0,
        };
        crate::log(&format!("🌾 {} off track → Recovering", self.driver_name()));
        self.set_state(DrivingState::Recovering);
    }

    /// Опасность рядом → Caution минимум на `duration`
    pub fn notify_hazard(&mut self, duration: f32) {
        if !self.state.is_active() || self.state == DrivingState::Recovering {
            return;
        }

        self.caution_timer = self.caution_timer.max(duration.max(0.0));
        self.set_state(DrivingState::Caution);
    }

    pub fn update_race_position(&mut self, standing: RaceStanding) {
        self.standing = standing;
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn state(&self) -> DrivingState {
        self.state
    }

    pub fn time_in_state(&self) -> f32 {
        self.time_in_state
    }

    pub fn steering_output(&self) -> &SteeringOutput {
        &self.steering
    }

    pub fn current_speed(&self) -> f32 {
        self.current_speed
    }

    pub fn target_speed(&self) -> f32 {
        self.target_speed
    }

    pub fn distance_to_racing_line(&self) -> Option<f32> {
        self.distance_to_line
    }

    pub fn is_overtaking(&self) -> bool {
        self.state == DrivingState::Overtaking
    }

    pub fn perceived_vehicles(&self) -> &[VehiclePerception] {
        &self.perceived
    }

    pub fn tactical_data(&self) -> &TacticalData {
        &self.tactical
    }

    /// 0..1 внутри текущего круга (0 до пересечения старта со стартовой решётки)
    pub fn racing_line_progress(&self) -> f32 {
        self.line_progress
    }

    pub fn laps_completed(&self) -> u32 {
        self.laps_completed
    }

    pub fn line_index(&self) -> usize {
        self.line_index
    }

    pub fn temperament(&self) -> &Temperament {
        &self.temperament
    }

    pub fn driver_profile(&self) -> Option<&Arc<DriverProfile>> {
        self.profile.as_ref()
    }

    pub fn racing_line(&self) -> Option<&Arc<RacingLine>> {
        self.racing_line.as_ref()
    }

    pub fn pawn(&self) -> Option<Entity> {
        self.pawn
    }

    pub fn difficulty_multiplier(&self) -> f32 {
        self.difficulty
    }

    pub fn is_rubber_banding_enabled(&self) -> bool {
        self.catch_up_enabled
    }

    pub fn overtake_threshold(&self) -> f32 {
        self.overtake_threshold
    }

    pub fn min_following_gap(&self) -> f32 {
        self.min_following_gap
    }

    pub fn race_standing(&self) -> &RaceStanding {
        &self.standing
    }

    pub fn tuning(&self) -> &RacerTuning {
        &self.tuning
    }

    pub fn has_pending_events(&self) -> bool {
        !self.outbox.is_empty()
    }

    /// Забирает накопленные события (очередь очищается)
    pub fn drain_events(&mut self) -> Vec<RacerEvent> {
        std::mem::take(&mut self.outbox)
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Один шаг решения
    ///
    /// `me` - snapshot машины, которой управляем (None → pawn исчез).
    /// `world` - snapshot'ы всех машин (свой пропускается).
    /// Возвращает None, если tick был no-op.
    pub fn tick(
        &mut self,
        me: Option<&VehicleSnapshot>,
        world: &[VehicleSnapshot],
        conditions: &TrackConditions,
        delta: f32,
        rng: &mut impl Rng,
    ) -> Option<SteeringOutput> {
        self.pawn?;
        let me = me?;
        let line = self.racing_line.clone()?;
        if !self.state.is_active() || delta <= 0.0 {
            return None;
        }

        self.current_speed = me.speed();

        self.update_perception(me, world);
        self.update_line_progress(&line, me.position);
        self.update_tactics(&line, delta);
        self.update_temperament(delta, rng);
        self.update_state_machine(&line, conditions, delta, rng);

        self.target_speed = self.calculate_target_speed(&line, conditions);
        self.steering = self.calculate_steering(&line, me, conditions, delta, rng);

        self.time_in_state += delta;
        Some(self.steering)
    }

    fn update_perception(&mut self, me: &VehicleSnapshot, world: &[VehicleSnapshot]) {
        let params = PerceptionParams {
            radius: self.tuning.perception_radius,
            slipstream_range: self.tuning.slipstream_range,
            slipstream_angle: self.tuning.slipstream_angle,
        };
        self.perceived = perceive(me, world, params);
    }

    /// Индекс двигается только вперёд; переход через старт = круг
    fn update_line_progress(&mut self, line: &RacingLine, position: Vec3) {
        let closest = if self.line_index_valid {
            line.closest_point_near(position, self.line_index)
        } else {
            let closest = line.closest_point(position);
            self.line_index = closest;
            self.line_index_valid = true;
            self.behind_start_line = line.distance_at(closest) > line.total_length() * 0.5;
            closest
        };

        let forward = line.forward_distance(self.line_index, closest);
        if closest != self.line_index && forward < line.total_length() * 0.5 {
            if closest < self.line_index {
                if self.behind_start_line {
                    self.behind_start_line = false;
                } else {
                    self.laps_completed += 1;
                    crate::log(&format!("🏁 {} lap {} completed", self.driver_name(), self.laps_completed));
                }
            }
            self.line_index = closest;
        }

        self.line_progress = if self.behind_start_line {
            0.0
        } else {
            line.progress_at(self.line_index)
        };
        self.distance_to_line = Some(position.distance(line.point(closest).position));
    }

    /// Смена состояния: сбрасывает time_in_state, пишет событие
    pub(crate) fn set_state(&mut self, new_state: DrivingState) {
        if new_state == self.state {
            return;
        }

        let old_state = self.state;
        self.state = new_state;
        self.time_in_state = 0.0;

        if old_state == DrivingState::Overtaking {
            self.overtake_cooldown = self.tuning.overtake_cooldown;
            self.overtake_timer = 0.0;
        }
        if new_state != DrivingState::Racing {
            self.tactical.drafting = false;
        }
        if matches!(old_state, DrivingState::Overtaking | DrivingState::Defending)
            && !matches!(new_state, DrivingState::Overtaking | DrivingState::Defending)
        {
            self.tactical.tactical_target = None;
        }

        crate::log(&format!(
            "🚗 {}: {} → {}",
            self.driver_name(),
            old_state.as_str(),
            new_state.as_str()
        ));
        self.outbox.push(RacerEvent::StateChanged {
            from: old_state,
            to: new_state,
        });
    }

    fn driver_name(&self) -> &str {
        self.profile.as_deref().map(|p| p.name.as_str()).unwrap_or("AI")
    }
}
