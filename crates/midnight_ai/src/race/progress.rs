//! Прогресс машин по racing line + детекция вылетов.

use bevy::prelude::*;

use super::RaceTrack;
use crate::ai::events::VehicleOffTrack;
use crate::components::{TrackProgress, Vehicle};
use crate::track::RacingLine;

/// Обновляет прогресс по позиции машины. Возвращает true, если машина
/// только что ушла за пределы трассы.
///
/// Индекс двигается только вперёд (меньше полукруга); переход через старт = круг.
pub fn advance_progress(
    line: &RacingLine,
    progress: &mut TrackProgress,
    position: Vec3,
    off_track_margin: f32,
) -> bool {
    let mut closest = line.closest_point_near(position, progress.line_index);
    // Окно не нашло машину (спавн посреди трассы, телепорт) → полный перебор
    if position.distance(line.point(closest).position) > line.point(closest).track_width {
        closest = line.closest_point(position);
    }
    let forward = line.forward_distance(progress.line_index, closest);

    if closest != progress.line_index && forward < line.total_length() * 0.5 {
        if closest < progress.line_index {
            progress.laps_completed += 1;
        }
        progress.line_index = closest;
    }

    // Проекция на направление текущей точки: непрерывная дистанция между точками
    let anchor = line.point(progress.line_index);
    let along = (position - anchor.position).dot(anchor.direction);
    progress.race_distance =
        progress.laps_completed as f32 * line.total_length() + anchor.distance_along_track + along;

    let nearest = line.point(closest);
    let right = nearest.direction.cross(Vec3::Y).normalize_or_zero();
    progress.lateral_offset = (position - nearest.position).dot(right);

    let was_off = progress.off_track;
    progress.off_track = progress.lateral_offset.abs() > nearest.track_width * 0.5 + off_track_margin;
    progress.off_track && !was_off
}

/// Система: TrackProgress всех машин + VehicleOffTrack на выходе за пределы
pub fn track_vehicle_progress(
    track: Option<Res<RaceTrack>>,
    mut vehicles: Query<(Entity, &Vehicle, &Transform, &mut TrackProgress)>,
    mut off_track: EventWriter<VehicleOffTrack>,
) {
    let Some(track) = track else {
        return;
    };

    for (entity, vehicle, transform, mut progress) in vehicles.iter_mut() {
        let laps_before = progress.laps_completed;

        if advance_progress(&track.line, &mut progress, transform.translation, track.off_track_margin) {
            crate::log(&format!(
                "🌾 {} off track ({:.1} m from line)",
                vehicle.name, progress.lateral_offset
            ));
            off_track.write(VehicleOffTrack { vehicle: entity });
        }

        if progress.laps_completed > laps_before {
            crate::log_info(&format!("🏁 {} lap {}", vehicle.name, progress.laps_completed));
        }
    }
}
