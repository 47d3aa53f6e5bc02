//! Tests for perception.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use super::super::perception::{
        is_in_slipstream, perceive, vehicle_ahead, vehicle_behind, PerceptionParams, VehicleSnapshot,
    };

    const PARAMS: PerceptionParams = PerceptionParams {
        radius: 50.0,
        slipstream_range: 25.0,
        slipstream_angle: 15.0,
    };

    fn snapshot(index: u32, position: Vec3, speed: f32) -> VehicleSnapshot {
        VehicleSnapshot {
            entity: Entity::from_raw(index),
            position,
            velocity: Vec3::NEG_Z * speed,
            forward: Vec3::NEG_Z,
            is_player: false,
        }
    }

    #[test]
    fn test_perceive_sorts_and_filters() {
        let me = snapshot(0, Vec3::ZERO, 30.0);
        let others = [
            me,
            snapshot(1, Vec3::new(0.0, 0.0, -20.0), 25.0), // впереди 20 м
            snapshot(2, Vec3::new(-3.0, 0.0, 8.0), 35.0),  // сзади слева
            snapshot(3, Vec3::new(0.0, 0.0, -80.0), 30.0), // вне радиуса
        ];

        let perceived = perceive(&me, &others, PARAMS);

        assert_eq!(perceived.len(), 2);
        assert_eq!(perceived[0].vehicle, Entity::from_raw(2));
        assert_eq!(perceived[1].vehicle, Entity::from_raw(1));

        let ahead = &perceived[1];
        assert!(ahead.is_ahead);
        assert!(ahead.angle.abs() < 1e-3);
        assert_eq!(ahead.speed_difference, 5.0);
        // Сближаемся на 5 m/s с 20 м → 4 s
        let ttc = ahead.time_to_collision.expect("closing");
        assert!((ttc - 4.0).abs() < 1e-3);

        let behind = &perceived[0];
        assert!(!behind.is_ahead);
        assert!(behind.is_on_left);
        assert!(behind.angle < -120.0);
    }

    #[test]
    fn test_no_ttc_when_separating() {
        let me = snapshot(0, Vec3::ZERO, 30.0);
        let faster = snapshot(1, Vec3::new(0.0, 0.0, -20.0), 40.0);

        let perceived = perceive(&me, &[faster], PARAMS);
        assert_eq!(perceived[0].time_to_collision, None);
    }

    #[test]
    fn test_ahead_and_behind_cones() {
        let me = snapshot(0, Vec3::ZERO, 30.0);
        let others = [
            // Сбоку (угол ~90°) - ни впереди, ни сзади по конусу
            snapshot(1, Vec3::new(4.0, 0.0, -0.5), 30.0),
            snapshot(2, Vec3::new(1.0, 0.0, -15.0), 30.0),
            snapshot(3, Vec3::new(-1.0, 0.0, 12.0), 30.0),
        ];

        let perceived = perceive(&me, &others, PARAMS);

        assert_eq!(vehicle_ahead(&perceived).map(|p| p.vehicle), Some(Entity::from_raw(2)));
        assert_eq!(vehicle_behind(&perceived).map(|p| p.vehicle), Some(Entity::from_raw(3)));

        let side = perceived.iter().find(|p| p.vehicle == Entity::from_raw(1)).expect("side car");
        assert!(!side.is_on_left);
        assert!(side.angle > 60.0);
    }

    #[test]
    fn test_slipstream_requires_being_behind_and_aligned() {
        let lead = snapshot(1, Vec3::new(0.0, 0.0, -10.0), 30.0);

        // Прямо позади
        assert!(is_in_slipstream(Vec3::ZERO, &lead, PARAMS));
        // Впереди лидера
        assert!(!is_in_slipstream(Vec3::new(0.0, 0.0, -20.0), &lead, PARAMS));
        // Слишком далеко
        assert!(!is_in_slipstream(Vec3::new(0.0, 0.0, 20.0), &lead, PARAMS));
        // Сильно сбоку (45°)
        assert!(!is_in_slipstream(Vec3::new(8.0, 0.0, -2.0), &lead, PARAMS));
    }
}
