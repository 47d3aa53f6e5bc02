//! Race integration test
//!
//! Полный headless App: race director + AI + kinematic физика.
//!
//! Проверяем:
//! - До RaceSignal::Start машины стоят
//! - AI гонка едет круг, выходы в допустимых диапазонах
//! - Stop → Finished + полный тормоз
//! - Машина игрока AI не трогает
//! - Контакт / опасность доходят до контроллеров

use std::sync::Arc;

use bevy::prelude::*;
use midnight_ai::*;

/// Helper: все DrivingStateChanged за прогон
#[derive(Resource, Default)]
struct StateLog(Vec<DrivingStateChanged>);

fn record_state_changes(mut events: EventReader<DrivingStateChanged>, mut log: ResMut<StateLog>) {
    log.0.extend(events.read().copied());
}

fn oval() -> Arc<RacingLine> {
    Arc::new(
        RacingLineBuilder::default()
            .build(&oval_centerline(200.0, 50.0, 5.0))
            .expect("oval builds"),
    )
}

/// Helper: полный race App + трасса
fn create_race_app(seed: u64, laps: u32) -> (App, Arc<RacingLine>) {
    let line = oval();
    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin)
        .insert_resource(RaceTrack::new(Arc::clone(&line), laps))
        .init_resource::<StateLog>()
        .add_systems(FixedUpdate, record_state_changes.after(RaceSet::Reactions));
    (app, line)
}

fn run_ticks(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        app.update();
    }
}

fn four_drivers() -> Vec<GridEntry> {
    vec![
        GridEntry::ai("Razor", Some(DriverProfile::preset("Razor", Personality::Aggressive))),
        GridEntry::ai("Wall", Some(DriverProfile::preset("Wall", Personality::Defensive))),
        GridEntry::ai("Prof", Some(DriverProfile::preset("Prof", Personality::Calculated))),
        GridEntry::ai("Ghost", None),
    ]
}

/// Helper: одиночная AI машина на первой прямой + контроллер
fn spawn_single_ai(app: &mut App, line: &Arc<RacingLine>, point: usize, speed: f32) -> (Entity, Entity) {
    let position = line.point(point).position;
    let direction = line.point(point).direction;

    let vehicle = app
        .world_mut()
        .spawn((
            Vehicle::new("Solo"),
            VehicleSpec::default(),
            VehicleBody {
                velocity: direction * speed,
            },
            VehicleInput::default(),
            TrackProgress::default(),
            Transform::from_translation(position).looking_to(direction, Vec3::Y),
        ))
        .id();

    let mut controller = RacerController::default();
    controller.set_racing_line(Arc::clone(line));
    controller.possess(vehicle);
    let controller = app.world_mut().spawn(controller).id();

    (vehicle, controller)
}

fn controller_state(app: &App, controller: Entity) -> DrivingState {
    app.world()
        .get::<RacerController>(controller)
        .map(|c| c.state())
        .expect("controller exists")
}

/// Test: без стартового сигнала AI ждёт, машины стоят
#[test]
fn test_grid_waits_for_start_signal() {
    let (mut app, line) = create_race_app(42, 1);
    let grid = spawn_grid(&mut app.world_mut().commands(), &line, &four_drivers());

    run_ticks(&mut app, 120);

    for slot in &grid {
        let controller = slot.controller.expect("AI slot has controller");
        assert_eq!(controller_state(&app, controller), DrivingState::Waiting);

        let body = app.world().get::<VehicleBody>(slot.vehicle).expect("vehicle body");
        assert_eq!(body.velocity, Vec3::ZERO);
        let input = app.world().get::<VehicleInput>(slot.vehicle).expect("vehicle input");
        assert_eq!(*input, VehicleInput::default());
    }
    assert!(!app.world().resource::<RaceStatus>().running);
}

/// Test: 4 AI проезжают круг, инварианты выходов каждый tick
#[test]
fn test_ai_race_completes_a_lap() {
    let (mut app, line) = create_race_app(42, 1);
    let grid = spawn_grid(&mut app.world_mut().commands(), &line, &four_drivers());
    app.world_mut().send_event(RaceSignal::Start);

    // 90 секунд максимум
    for tick in 0..(60 * 90) {
        app.update();

        for slot in &grid {
            let input = app.world().get::<VehicleInput>(slot.vehicle).expect("vehicle input");
            assert!(
                (-1.0..=1.0).contains(&input.steering)
                    && (0.0..=1.0).contains(&input.throttle)
                    && (0.0..=1.0).contains(&input.brake),
                "Tick {}: input out of range {:?}",
                tick,
                input
            );
        }

        if !app.world().resource::<RaceStatus>().finish_order.is_empty() {
            break;
        }
    }

    let status = app.world().resource::<RaceStatus>();
    assert!(!status.finish_order.is_empty(), "nobody finished a lap in 90s");

    // Победитель после финиша - Finished + полный тормоз
    let winner = status.finish_order[0];
    let slot = grid.iter().find(|slot| slot.vehicle == winner).expect("winner on grid");
    let controller = slot.controller.expect("AI winner");
    assert_eq!(controller_state(&app, controller), DrivingState::Finished);

    // Остальные тоже уехали со старта
    for slot in &grid {
        let progress = app.world().get::<TrackProgress>(slot.vehicle).expect("progress");
        assert!(progress.race_distance > 200.0, "{:?} only {:.0} m", slot.vehicle, progress.race_distance);
    }

    midnight_ai::log_info(&format!("✓ AI race: lap completed in {:.1}s", status.elapsed));
}

/// Test: старт с решётки (позади стартовой линии) не считается кругом
#[test]
fn test_grid_start_crossing_is_not_a_lap() {
    let (mut app, line) = create_race_app(42, 3);
    let grid = spawn_grid(&mut app.world_mut().commands(), &line, &four_drivers()[..2]);
    app.world_mut().send_event(RaceSignal::Start);
    run_ticks(&mut app, 8 * 60);

    for slot in &grid {
        let progress = app.world().get::<TrackProgress>(slot.vehicle).expect("progress");
        let controller = slot.controller.expect("AI slot has controller");
        let controller = app.world().get::<RacerController>(controller).expect("controller exists");

        // Уже пересекли старт и уехали вперёд
        assert!(progress.line_index > 0 && progress.race_distance > 0.0, "{:?}", progress);
        assert_eq!(controller.laps_completed(), progress.laps_completed);
        assert_eq!(controller.laps_completed(), 0);
        let expected = line.progress_at(progress.line_index);
        assert!(
            (controller.racing_line_progress() - expected).abs() < 0.05,
            "controller {:.3} vs director {:.3}",
            controller.racing_line_progress(),
            expected
        );
    }
}

/// Test: Stop → все контроллеры Finished, машины тормозят
#[test]
fn test_stop_signal_finishes_everyone() {
    let (mut app, line) = create_race_app(7, 3);
    let grid = spawn_grid(&mut app.world_mut().commands(), &line, &four_drivers());
    app.world_mut().send_event(RaceSignal::Start);
    run_ticks(&mut app, 300);

    app.world_mut().send_event(RaceSignal::Stop);
    run_ticks(&mut app, 2);

    for slot in &grid {
        let controller = slot.controller.expect("AI slot has controller");
        assert_eq!(controller_state(&app, controller), DrivingState::Finished);

        let input = app.world().get::<VehicleInput>(slot.vehicle).expect("vehicle input");
        assert_eq!(*input, VehicleInput::full_brake());
    }
    assert!(!app.world().resource::<RaceStatus>().running);

    // Waiting → Racing и ... → Finished для каждого контроллера
    let log = app.world().resource::<StateLog>();
    for slot in &grid {
        let controller = slot.controller.expect("AI slot has controller");
        assert!(log
            .0
            .iter()
            .any(|e| e.controller == controller && e.from == DrivingState::Waiting && e.to == DrivingState::Racing));
        assert!(log
            .0
            .iter()
            .any(|e| e.controller == controller && e.to == DrivingState::Finished && e.vehicle == Some(slot.vehicle)));
    }
}

/// Test: машину игрока AI не трогает, но учитывает в standings
#[test]
fn test_player_vehicle_is_not_driven_by_ai() {
    let (mut app, line) = create_race_app(42, 3);
    // Игрок в последнем ряду
    let mut entries = four_drivers();
    entries.push(GridEntry::player("You"));
    let grid = spawn_grid(&mut app.world_mut().commands(), &line, &entries);
    app.world_mut().send_event(RaceSignal::Start);
    run_ticks(&mut app, 240);

    let player = grid[4];
    assert!(player.controller.is_none());
    assert!(app.world().get::<PlayerControlled>(player.vehicle).is_some());
    assert_eq!(
        *app.world().get::<VehicleInput>(player.vehicle).expect("input"),
        VehicleInput::default()
    );

    // Игрок стоит на старте → все AI впереди, standings на 5 машин
    for slot in &grid[..4] {
        let controller = slot.controller.expect("AI slot has controller");
        let standing = *app
            .world()
            .get::<RacerController>(controller)
            .expect("controller")
            .race_standing();
        assert_eq!(standing.total, 5);
        assert!(standing.position >= 1 && standing.position <= 4);
    }
}

/// Test: удар в стоящую машину → Recovering
#[test]
fn test_collision_sends_ai_into_recovery() {
    let (mut app, line) = create_race_app(42, 3);
    let (ai, controller) = spawn_single_ai(&mut app, &line, 10, 20.0);

    // Игрок стоит в 2.5 м впереди по линии
    let direction = line.point(10).direction;
    let blocker = app
        .world_mut()
        .spawn((
            Vehicle::new("Blocker"),
            PlayerControlled,
            VehicleSpec::default(),
            VehicleBody::default(),
            VehicleInput::default(),
            TrackProgress::default(),
            Transform::from_translation(line.point(10).position + direction * 2.5).looking_to(direction, Vec3::Y),
        ))
        .id();

    app.world_mut().send_event(RaceSignal::Start);
    run_ticks(&mut app, 5);

    assert_eq!(controller_state(&app, controller), DrivingState::Recovering);

    let log = app.world().resource::<StateLog>();
    assert!(log
        .0
        .iter()
        .any(|e| e.controller == controller && e.vehicle == Some(ai) && e.to == DrivingState::Recovering));
    assert!(app.world().get::<Vehicle>(blocker).is_some());
}

/// Test: TrackHazard рядом → Caution, далеко → игнор
#[test]
fn test_hazard_triggers_caution_in_radius() {
    let (mut app, line) = create_race_app(42, 3);
    let (near, near_controller) = spawn_single_ai(&mut app, &line, 10, 0.0);
    let (_, far_controller) = spawn_single_ai(&mut app, &line, 60, 0.0);

    app.world_mut().send_event(RaceSignal::Start);
    run_ticks(&mut app, 30);

    let position = app.world().get::<Transform>(near).expect("transform").translation;
    app.world_mut().send_event(TrackHazard {
        position,
        radius: 20.0,
        duration: 3.0,
    });
    run_ticks(&mut app, 2);

    assert_eq!(controller_state(&app, near_controller), DrivingState::Caution);
    assert_ne!(controller_state(&app, far_controller), DrivingState::Caution);

    // 3 секунды Caution → обратно в гонку
    run_ticks(&mut app, 60 * 4);
    assert_ne!(controller_state(&app, near_controller), DrivingState::Caution);
}
