//! Decision tick: snapshot'ы машин → RacerController::tick → VehicleInput pawn'а.

use bevy::prelude::*;

use crate::ai::components::{DrivingState, VehicleSnapshot};
use crate::ai::controller::RacerController;
use crate::components::{PlayerControlled, Vehicle, VehicleBody, VehicleInput};
use crate::track::TrackConditions;
use crate::DeterministicRng;

/// Snapshot'ы всех машин, отсортированные по Entity (детерминизм)
pub fn collect_vehicle_snapshots<'a>(
    vehicles: impl Iterator<Item = (Entity, &'a Transform, &'a VehicleBody, bool)>,
) -> Vec<VehicleSnapshot> {
    let mut snapshots: Vec<VehicleSnapshot> = vehicles
        .map(|(entity, transform, body, is_player)| {
            VehicleSnapshot::from_transform(entity, transform, body.velocity, is_player)
        })
        .collect();
    snapshots.sort_by_key(|snapshot| snapshot.entity);
    snapshots
}

/// Система: один AI tick для каждого контроллера
///
/// Контроллеры обходятся в порядке Entity, RNG общий → одинаковый seed даёт ту же гонку.
/// Finished → каждый tick пишем полный тормоз.
pub fn tick_racer_controllers(
    mut controllers: Query<(Entity, &mut RacerController)>,
    vehicles: Query<(Entity, &Transform, &VehicleBody, Has<PlayerControlled>), With<Vehicle>>,
    mut inputs: Query<&mut VehicleInput>,
    conditions: Res<TrackConditions>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();
    if delta <= 0.0 {
        return;
    }

    let world = collect_vehicle_snapshots(vehicles.iter());

    let mut order: Vec<Entity> = controllers.iter().map(|(entity, _)| entity).collect();
    order.sort();

    for controller_entity in order {
        let Ok((_, mut controller)) = controllers.get_mut(controller_entity) else {
            continue;
        };
        let Some(pawn) = controller.pawn() else {
            continue;
        };

        let me = world.iter().find(|snapshot| snapshot.entity == pawn);
        if me.is_none() {
            crate::log_warning(&format!(
                "⚠️ Controller {:?}: pawn {:?} despawned → unpossess",
                controller_entity, pawn
            ));
            controller.unpossess();
            continue;
        }

        let output = controller.tick(me, &world, &conditions, delta, &mut rng.rng);

        let input = match (output, controller.state()) {
            (_, DrivingState::Finished) => VehicleInput::full_brake(),
            (Some(output), _) => VehicleInput::from(&output),
            (None, _) => continue,
        };

        if let Ok(mut vehicle_input) = inputs.get_mut(pawn) {
            *vehicle_input = input;
        }
    }
}
