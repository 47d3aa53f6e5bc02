//! Tests for kinematic vehicle model.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use crate::components::{VehicleBody, VehicleInput, VehicleSpec};
    use crate::physics::{integrate_vehicle, longitudinal_accel, yaw_rate};

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_full_throttle_accelerates_forward() {
        let spec = VehicleSpec::default();
        let input = VehicleInput {
            throttle: 1.0,
            ..Default::default()
        };
        let mut body = VehicleBody::default();
        let mut transform = Transform::default();

        for _ in 0..60 {
            integrate_vehicle(&spec, &input, &mut body, &mut transform, DT);
        }

        // Forward в Bevy - -Z
        assert!(transform.translation.z < -1.0);
        assert!(transform.translation.x.abs() < 1e-3);
        let speed = body.velocity.length();
        assert!(speed > 7.0 && speed <= spec.acceleration);
    }

    #[test]
    fn test_speed_clamped_to_spec() {
        let spec = VehicleSpec {
            max_speed: 10.0,
            ..Default::default()
        };
        let input = VehicleInput {
            throttle: 1.0,
            nos: true,
            ..Default::default()
        };
        let mut body = VehicleBody::default();
        let mut transform = Transform::default();

        for _ in 0..600 {
            integrate_vehicle(&spec, &input, &mut body, &mut transform, DT);
        }

        assert!(body.velocity.length() <= 10.0 + 1e-4);
    }

    #[test]
    fn test_brake_never_reverses() {
        let spec = VehicleSpec::default();
        let input = VehicleInput::full_brake();
        let mut body = VehicleBody {
            velocity: Vec3::NEG_Z * 5.0,
        };
        let mut transform = Transform::default();

        for _ in 0..120 {
            integrate_vehicle(&spec, &input, &mut body, &mut transform, DT);
        }

        assert_eq!(body.velocity.length(), 0.0);
    }

    #[test]
    fn test_positive_steering_turns_right() {
        let spec = VehicleSpec::default();
        let input = VehicleInput {
            steering: 1.0,
            throttle: 0.5,
            ..Default::default()
        };
        let mut body = VehicleBody {
            velocity: Vec3::NEG_Z * 20.0,
        };
        let mut transform = Transform::default();

        for _ in 0..30 {
            integrate_vehicle(&spec, &input, &mut body, &mut transform, DT);
        }

        // Right для forward -Z - это +X
        assert!(transform.translation.x > 0.5);
        assert!(yaw_rate(&spec, 1.0, 20.0) < 0.0);
        assert_eq!(yaw_rate(&spec, 1.0, 0.0), 0.0);
    }

    #[test]
    fn test_nos_boosts_acceleration() {
        let spec = VehicleSpec::default();
        let plain = VehicleInput {
            throttle: 1.0,
            ..Default::default()
        };
        let boosted = VehicleInput { nos: true, ..plain };

        assert!(longitudinal_accel(&spec, &boosted, 10.0) > longitudinal_accel(&spec, &plain, 10.0));
    }
}
