//! Outbox контроллеров → Bevy events.

use bevy::prelude::*;

use crate::ai::controller::{RacerController, RacerEvent};
use crate::ai::events::{DrivingStateChanged, OvertakeCompleted, WasOvertaken};

/// System: drain outbox каждого контроллера (порядок по Entity)
pub fn emit_racer_events(
    mut controllers: Query<(Entity, &mut RacerController)>,
    mut state_changed: EventWriter<DrivingStateChanged>,
    mut overtakes: EventWriter<OvertakeCompleted>,
    mut overtaken: EventWriter<WasOvertaken>,
) {
    let mut pending: Vec<(Entity, Option<Entity>, Vec<RacerEvent>)> = controllers
        .iter_mut()
        .filter(|(_, controller)| controller.has_pending_events())
        .map(|(entity, mut controller)| (entity, controller.pawn(), controller.drain_events()))
        .collect();
    pending.sort_by_key(|(entity, _, _)| *entity);

    for (controller, vehicle, events) in pending {
        for event in events {
            match event {
                RacerEvent::StateChanged { from, to } => {
                    state_changed.write(DrivingStateChanged { controller, vehicle, from, to });
                }
                RacerEvent::OvertakeCompleted { overtaken: target, strategy } => {
                    overtakes.write(OvertakeCompleted {
                        controller,
                        vehicle,
                        overtaken: target,
                        strategy,
                    });
                }
                RacerEvent::WasOvertaken { by } => {
                    overtaken.write(WasOvertaken { controller, vehicle, by });
                }
            }
        }
    }
}
