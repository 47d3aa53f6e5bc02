//! Tests for steering output + PID.

#[cfg(test)]
mod tests {
    use super::super::steering::{SteeringOutput, SteeringPid};
    use crate::components::VehicleInput;

    #[test]
    fn test_steering_output_default() {
        let output = SteeringOutput::default();
        assert_eq!(output.steering, 0.0);
        assert_eq!(output.throttle, 0.0);
        assert_eq!(output.brake, 0.0);
        assert_eq!(output.confidence, 1.0);
        assert!(!output.nos);
    }

    #[test]
    fn test_clamp_channels() {
        let mut output = SteeringOutput {
            steering: -3.0,
            throttle: 1.4,
            brake: -0.2,
            confidence: 2.0,
            ..Default::default()
        };
        output.clamp_channels();

        assert_eq!(output.steering, -1.0);
        assert_eq!(output.throttle, 1.0);
        assert_eq!(output.brake, 0.0);
        assert_eq!(output.confidence, 1.0);
    }

    #[test]
    fn test_full_brake_into_vehicle_input() {
        let input = VehicleInput::from(&SteeringOutput::full_brake());
        assert_eq!(input, VehicleInput::full_brake());
    }

    #[test]
    fn test_pid_proportional_sign() {
        let mut pid = SteeringPid::new(2.0, 0.0, 0.0);
        assert_eq!(pid.update(0.25, 1.0 / 60.0), 0.5);
        assert_eq!(pid.update(-0.25, 1.0 / 60.0), -0.5);
        // Выход ограничен
        assert_eq!(pid.update(3.0, 1.0 / 60.0), 1.0);
    }

    #[test]
    fn test_pid_integral_windup_clamped() {
        let mut pid = SteeringPid::default();
        for _ in 0..1000 {
            pid.update(1.0, 0.1);
        }
        assert_eq!(pid.integral(), SteeringPid::INTEGRAL_LIMIT);

        pid.reset();
        assert_eq!(pid.integral(), 0.0);
    }
}
