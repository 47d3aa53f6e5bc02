//! Steering output + PID регулятор руления.

use bevy::prelude::*;

use crate::components::VehicleInput;

/// Результат одного tick'а AI (применяется к VehicleInput машины)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringOutput {
    /// -1..1, положительное - вправо
    pub steering: f32,
    /// 0..1
    pub throttle: f32,
    /// 0..1
    pub brake: f32,
    pub handbrake: bool,
    pub nos: bool,
    /// Куда целимся (world space)
    pub target_point: Vec3,
    pub desired_gear: i32,
    /// Уверенность 0..1 (контакт, износ резины, ошибки)
    pub confidence: f32,
}

impl Default for SteeringOutput {
    fn default() -> Self {
        Self {
            steering: 0.0,
            throttle: 0.0,
            brake: 0.0,
            handbrake: false,
            nos: false,
            target_point: Vec3::ZERO,
            desired_gear: 0,
            confidence: 1.0,
        }
    }
}

impl SteeringOutput {
    pub fn full_brake() -> Self {
        Self {
            brake: 1.0,
            ..Default::default()
        }
    }

    /// Приводит все каналы к допустимым диапазонам
    pub fn clamp_channels(&mut self) {
        self.steering = self.steering.clamp(-1.0, 1.0);
        self.throttle = self.throttle.clamp(0.0, 1.0);
        self.brake = self.brake.clamp(0.0, 1.0);
        self.confidence = self.confidence.clamp(0.0, 1.0);
    }
}

impl From<&SteeringOutput> for VehicleInput {
    fn from(output: &SteeringOutput) -> Self {
        Self {
            steering: output.steering,
            throttle: output.throttle,
            brake: output.brake,
            handbrake: output.handbrake,
            nos: output.nos,
        }
    }
}

/// PID по ошибке курса (радианы)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringPid {
    pub p_gain: f32,
    pub i_gain: f32,
    pub d_gain: f32,
    integral: f32,
    last_error: f32,
}

impl SteeringPid {
    /// Лимит интегральной составляющей (anti-windup)
    pub const INTEGRAL_LIMIT: f32 = 1.0;

    pub fn new(p_gain: f32, i_gain: f32, d_gain: f32) -> Self {
        Self {
            p_gain,
            i_gain,
            d_gain,
            integral: 0.0,
            last_error: 0.0,
        }
    }

    /// Возвращает steering, уже ограниченный -1..1
    pub fn update(&mut self, error: f32, delta: f32) -> f32 {
        self.integral = (self.integral + error * delta).clamp(-Self::INTEGRAL_LIMIT, Self::INTEGRAL_LIMIT);

        let derivative = (error - self.last_error) / delta.max(0.001);
        self.last_error = error;

        (self.p_gain * error + self.i_gain * self.integral + self.d_gain * derivative).clamp(-1.0, 1.0)
    }

    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.last_error = 0.0;
    }

    pub fn integral(&self) -> f32 {
        self.integral
    }
}

impl Default for SteeringPid {
    fn default() -> Self {
        Self::new(2.0, 0.1, 0.5)
    }
}
