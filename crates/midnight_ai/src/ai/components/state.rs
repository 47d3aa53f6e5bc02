//! Driving state machine + тактические enum'ы.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Состояние AI водителя (ровно одно активно)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum DrivingState {
    /// До старта - ждём RaceSignal::Start
    #[default]
    Waiting,
    /// Обычная езда по racing line (включая drafting sub-mode)
    Racing,
    /// Атака машины впереди
    Overtaking,
    /// Защита позиции от машины сзади
    Defending,
    /// Возврат на racing line после контакта / вылета
    Recovering,
    /// Опасность на трассе - снижаем скорость
    Caution,
    /// Skill-based catch-up: больше риска, позже тормозим
    CatchingUp,
    /// Лидер с большим отрывом - меньше риска
    SlowingDown,
    /// Гонка окончена, полный тормоз
    Finished,
}

impl DrivingState {
    /// Состояния, в которых машина реально гоняется (не стоит / не финишировала)
    pub fn is_active(self) -> bool {
        !matches!(self, DrivingState::Waiting | DrivingState::Finished)
    }

    /// Racing и его варианты без особой тактики
    pub fn is_racing_variant(self) -> bool {
        matches!(
            self,
            DrivingState::Racing | DrivingState::CatchingUp | DrivingState::SlowingDown
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DrivingState::Waiting => "Waiting",
            DrivingState::Racing => "Racing",
            DrivingState::Overtaking => "Overtaking",
            DrivingState::Defending => "Defending",
            DrivingState::Recovering => "Recovering",
            DrivingState::Caution => "Caution",
            DrivingState::CatchingUp => "CatchingUp",
            DrivingState::SlowingDown => "SlowingDown",
            DrivingState::Finished => "Finished",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Serialize, Deserialize)]
pub enum OvertakeStrategy {
    /// Небольшое смещение, ждём ошибки
    #[default]
    Patient,
    /// Нырок внутрь на торможении
    LateBraking,
    /// Лучший выход из поворота
    BetterExit,
    /// По внешней траектории
    AroundOutside,
    /// Выход из слипстрима
    SlipstreamPass,
    /// Давим вплотную
    Pressure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Serialize, Deserialize)]
pub enum DefenseStrategy {
    /// Держим racing line
    #[default]
    CoverLine,
    /// Закрываем внутренний радиус
    CoverInside,
    /// Не даём сократить отставание
    PaceDefense,
    /// Защитная траектория в повороте
    DefensiveLine,
}

/// Режим skill-based catch-up (не rubber banding: физика машины не меняется)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Serialize, Deserialize)]
pub enum CatchUpBehavior {
    #[default]
    None,
    /// Позже тормозим, раньше газуем
    RiskTaking,
    /// Ищем слипстрим
    DraftingFocus,
    /// Предел навыка
    MaxEffort,
    /// Лидер - шире запас безопасности
    Conservation,
}

/// Реакция на контакт (из профиля водителя)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Serialize, Deserialize)]
pub enum ContactResponse {
    #[default]
    Ignore,
    /// Увеличить дистанцию, прервать обгон обидчика
    BackOff,
    /// Battle mode против обидчика
    Retaliate,
    /// Осторожнее: больше дистанция, меньше catch-up риска
    Protect,
    /// Battle mode, если обидчик быстрее
    Mirror,
    /// Только запомнить
    Report,
}
