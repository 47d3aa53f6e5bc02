//! Physics simulation module
//!
//! Kinematic модель машины + proximity контакты.
//! Минимальная замена vehicle physics: одинакова для AI и игрока.

pub mod contacts;
pub mod vehicle;

#[cfg(test)]
mod vehicle_tests;

use bevy::prelude::*;

use crate::RaceSet;

// Re-export основных типов
pub use contacts::{resolve_vehicle_contacts, VehicleCollision, CONTACT_RADIUS};
pub use vehicle::{drive_vehicles, integrate_vehicle, longitudinal_accel, yaw_rate};

/// Plugin: интеграция движения + контакты (FixedUpdate, RaceSet::Physics)
pub struct VehiclePhysicsPlugin;

impl Plugin for VehiclePhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<VehicleCollision>().add_systems(
            FixedUpdate,
            (drive_vehicles, resolve_vehicle_contacts)
                .chain()
                .in_set(RaceSet::Physics),
        );
    }
}
