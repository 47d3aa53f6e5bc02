//! Midnight Grind AI racer
//!
//! ECS-симуляция гонки на Bevy 0.16 (headless):
//! - ai - RacerController (driving state machine, steering, тактика, темперамент)
//! - race - race director (старт/стоп, прогресс, standings, финиш)
//! - track - racing line, генератор, погода
//! - physics - kinematic машины + контакты (одинаковые для AI и игрока)
//!
//! AI управляет машиной только через VehicleInput: VehicleSpec никогда не трогаем.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod components;
pub mod error;
pub mod logger;
pub mod physics;
pub mod race;
pub mod track;

// Re-export базовых компонентов для удобства
pub use ai::{
    CollisionReport, DriverProfile, DrivingState, DrivingStateChanged, OvertakeCompleted, OvertakeStrategy,
    Personality, RaceStanding, RacerAIPlugin, RacerController, RacerEvent, RacerTuning, SteeringOutput,
    TrackHazard, VehicleOffTrack, VehicleSnapshot, WasOvertaken,
};
pub use components::*;
pub use error::{RacerAIError, Result};
pub use physics::{VehicleCollision, VehiclePhysicsPlugin};
pub use race::{spawn_grid, GridEntry, GridSlot, RaceDirectorPlugin, RaceSignal, RaceStatus, RaceTrack};
pub use track::{oval_centerline, RacingLine, RacingLineBuilder, RacingLinePoint, RacingLineParams, TrackConditions};

// Logger (crate::log и т.д. - короткие пути для всех модулей)
pub use logger::{
    init_logger, log, log_error, log_info, log_level, log_warning, log_with_level, set_log_level, set_logger,
    set_logger_if_needed, ConsoleLogger, LogLevel, LogPrinter,
};

/// Порядок фаз в FixedUpdate (chain)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RaceSet {
    /// Сигналы гонки, прогресс, standings
    Director,
    /// AI tick → VehicleInput
    Decision,
    /// Интеграция движения, контакты
    Physics,
    /// Реакции AI на события физики/гонки, outbox → events
    Reactions,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Seed из create_headless_app не перетираем
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            .init_resource::<TrackConditions>()
            .configure_sets(
                FixedUpdate,
                (
                    RaceSet::Director,
                    RaceSet::Decision,
                    RaceSet::Physics,
                    RaceSet::Reactions,
                )
                    .chain(),
            )
            .add_plugins((RaceDirectorPlugin, RacerAIPlugin, VehiclePhysicsPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время шагает вручную: один app.update() = ровно один FixedUpdate tick (1/60 s),
/// независимо от wall clock.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)) // 60Hz FixedUpdate
        .insert_resource(bevy::time::TimeUpdateStrategy::ManualDuration(
            std::time::Duration::from_secs_f64(1.0 / 60.0),
        ));

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
