//! Kinematic модель машины
//!
//! Архитектура:
//! - Скорость только вдоль forward (без заноса)
//! - Газ/тормоз/drag интегрируем сами в FixedUpdate
//! - Yaw rate ∝ steering, падает на низкой скорости (машина не крутится на месте)
//!
//! Одна модель для всех машин: AI получает ровно те же возможности, что и игрок.

use bevy::prelude::*;

use crate::components::{VehicleBody, VehicleInput, VehicleSpec};

/// Скорость, на которой руление даёт половину max_yaw_rate (m/s)
const STEERING_HALF_SPEED: f32 = 5.0;

/// Доля braking_decel для ручника
const HANDBRAKE_FACTOR: f32 = 0.5;

/// Продольное ускорение от входов (m/s²)
pub fn longitudinal_accel(spec: &VehicleSpec, input: &VehicleInput, speed: f32) -> f32 {
    let nos = if input.nos { spec.nos_multiplier } else { 1.0 };
    let mut accel = input.throttle.clamp(0.0, 1.0) * spec.acceleration * nos
        - input.brake.clamp(0.0, 1.0) * spec.braking_decel
        - spec.drag * speed;

    if input.handbrake {
        accel -= spec.braking_decel * HANDBRAKE_FACTOR;
    }

    accel
}

/// Yaw rate (rad/s, вокруг +Y). Положительный steering = вправо = отрицательный yaw.
pub fn yaw_rate(spec: &VehicleSpec, steering: f32, speed: f32) -> f32 {
    let speed_factor = speed / (speed + STEERING_HALF_SPEED);
    -steering.clamp(-1.0, 1.0) * spec.max_yaw_rate * speed_factor
}

/// Один шаг интеграции (вынесен из системы для unit-тестов)
pub fn integrate_vehicle(
    spec: &VehicleSpec,
    input: &VehicleInput,
    body: &mut VehicleBody,
    transform: &mut Transform,
    delta: f32,
) {
    let forward = transform.forward().as_vec3();
    let speed = body.velocity.dot(forward).max(0.0);

    let new_speed = (speed + longitudinal_accel(spec, input, speed) * delta).clamp(0.0, spec.max_speed);

    transform.rotate_y(yaw_rate(spec, input.steering, new_speed) * delta);

    body.velocity = transform.forward().as_vec3() * new_speed;
    transform.translation += body.velocity * delta;
}

/// Система: VehicleInput → VehicleBody + Transform
///
/// Работает в FixedUpdate (60Hz) для детерминизма.
pub fn drive_vehicles(
    mut query: Query<(&VehicleSpec, &VehicleInput, &mut VehicleBody, &mut Transform)>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();
    if delta <= 0.0 {
        return;
    }

    for (spec, input, mut body, mut transform) in query.iter_mut() {
        integrate_vehicle(spec, input, &mut body, &mut transform, delta);
    }
}
