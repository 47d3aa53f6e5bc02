//! Proximity контакты между машинами
//!
//! Машина = круг радиуса CONTACT_RADIUS в плоскости XZ.
//! Пересечение → расталкиваем + гасим сближающую скорость + VehicleCollision event
//! (только если машины сближались, иначе касание бортами спамило бы events каждый tick).

use bevy::prelude::*;

use crate::components::{Vehicle, VehicleBody};

/// Радиус «корпуса» машины (метры)
pub const CONTACT_RADIUS: f32 = 1.5;

/// Event: контакт двух машин (пишется для каждой из сторон)
#[derive(Event, Debug, Clone)]
pub struct VehicleCollision {
    /// Машина, для которой пишется event
    pub vehicle: Entity,
    /// С кем столкнулась
    pub other: Entity,
    pub impact_point: Vec3,
    /// Нормаль от other к vehicle (normalized, XZ)
    pub impact_normal: Vec3,
    /// Скорости до разрешения контакта
    pub velocity: Vec3,
    pub other_velocity: Vec3,
}

/// Система: обнаружение и разрешение контактов
pub fn resolve_vehicle_contacts(
    mut vehicles: Query<(Entity, &mut Transform, &mut VehicleBody), With<Vehicle>>,
    mut collisions: EventWriter<VehicleCollision>,
) {
    let snapshot: Vec<(Entity, Vec3, Vec3)> = vehicles
        .iter()
        .map(|(entity, transform, body)| (entity, transform.translation, body.velocity))
        .collect();

    let min_distance = CONTACT_RADIUS * 2.0;
    let mut corrections: Vec<(Entity, Vec3, Vec3)> = Vec::new();

    for (i, &(a, pos_a, vel_a)) in snapshot.iter().enumerate() {
        for &(b, pos_b, vel_b) in &snapshot[i + 1..] {
            let mut diff = pos_a - pos_b;
            diff.y = 0.0;
            let distance = diff.length();

            if distance >= min_distance || distance < 0.001 {
                continue;
            }

            let normal = diff / distance; // b → a
            let overlap = min_distance - distance;

            // Скорость сближения вдоль нормали (> 0 - едут друг в друга)
            let closing = (vel_b - vel_a).dot(normal);
            let impulse = if closing > 0.0 { normal * closing * 0.5 } else { Vec3::ZERO };

            corrections.push((a, normal * overlap * 0.5, impulse));
            corrections.push((b, -normal * overlap * 0.5, -impulse));

            if closing > 0.0 {
                let impact_point = (pos_a + pos_b) * 0.5;
                collisions.write(VehicleCollision {
                    vehicle: a,
                    other: b,
                    impact_point,
                    impact_normal: normal,
                    velocity: vel_a,
                    other_velocity: vel_b,
                });
                collisions.write(VehicleCollision {
                    vehicle: b,
                    other: a,
                    impact_point,
                    impact_normal: -normal,
                    velocity: vel_b,
                    other_velocity: vel_a,
                });
            }
        }
    }

    for (entity, push, impulse) in corrections {
        let Ok((_, mut transform, mut body)) = vehicles.get_mut(entity) else {
            continue;
        };
        transform.translation += push;
        body.velocity += impulse;
    }
}
