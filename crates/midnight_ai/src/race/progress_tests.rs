//! Tests for track progress (laps, race distance, off-track edge).

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use super::super::advance_progress;
    use crate::components::TrackProgress;
    use crate::track::{oval_centerline, RacingLine, RacingLineBuilder};

    fn oval() -> RacingLine {
        RacingLineBuilder::default()
            .build(&oval_centerline(200.0, 50.0, 5.0))
            .expect("oval builds")
    }

    /// Проезжаем по точкам линии (шаг 1 точка)
    fn drive_points(line: &RacingLine, progress: &mut TrackProgress, from: usize, count: usize) {
        for step in 0..count {
            let position = line.point(from + step).position;
            advance_progress(line, progress, position, 2.0);
        }
    }

    #[test]
    fn test_progress_counts_laps() {
        let line = oval();
        let mut progress = TrackProgress::default();

        drive_points(&line, &mut progress, 0, line.len() + 5);

        assert_eq!(progress.laps_completed, 1);
        assert_eq!(progress.line_index, 4);
        assert!(progress.race_distance > line.total_length());
    }

    #[test]
    fn test_progress_never_goes_backwards() {
        let line = oval();
        let mut progress = TrackProgress::default();
        drive_points(&line, &mut progress, 0, 10);
        assert_eq!(progress.line_index, 9);

        // Откат назад на 3 точки → индекс не двигается
        advance_progress(&line, &mut progress, line.point(6).position, 2.0);

        assert_eq!(progress.line_index, 9);
        assert_eq!(progress.laps_completed, 0);
    }

    #[test]
    fn test_race_distance_negative_behind_start() {
        let line = oval();
        let mut progress = TrackProgress::default();

        // 10 м до старта по прямой (старт на x = radius, едем в -Z)
        let start = line.point(0).position;
        advance_progress(&line, &mut progress, start + Vec3::Z * 10.0, 2.0);

        assert_eq!(progress.line_index, 0);
        assert!(progress.race_distance < 0.0, "distance {}", progress.race_distance);
        assert!((progress.race_distance + 10.0).abs() < 1.0);
    }

    #[test]
    fn test_off_track_fires_only_on_edge() {
        let line = oval();
        let mut progress = TrackProgress::default();
        let point = line.point(5).position;
        let width = line.point(5).track_width;

        // Внутри трассы
        assert!(!advance_progress(&line, &mut progress, point + Vec3::X * 2.0, 2.0));
        assert!(!progress.off_track);

        // За краем: событие один раз
        let outside = point + Vec3::X * (width * 0.5 + 3.0);
        assert!(advance_progress(&line, &mut progress, outside, 2.0));
        assert!(progress.off_track);
        assert!(!advance_progress(&line, &mut progress, outside, 2.0));

        // Вернулись и снова вылетели → снова событие
        assert!(!advance_progress(&line, &mut progress, point, 2.0));
        assert!(advance_progress(&line, &mut progress, outside, 2.0));
    }

    #[test]
    fn test_lateral_offset_sign() {
        let line = oval();
        let mut progress = TrackProgress::default();
        let point = line.point(5).position;

        // forward -Z → right = +X
        advance_progress(&line, &mut progress, point + Vec3::X * 3.0, 2.0);
        assert!((progress.lateral_offset - 3.0).abs() < 0.01);

        advance_progress(&line, &mut progress, point - Vec3::X * 3.0, 2.0);
        assert!((progress.lateral_offset + 3.0).abs() < 0.01);
    }

    #[test]
    fn test_progress_resyncs_far_from_hint() {
        let line = oval();
        let mut progress = TrackProgress::default();

        // Спавн посреди первого поворота: окно вокруг 0 туда не достаёт
        advance_progress(&line, &mut progress, line.point(60).position, 2.0);

        assert_eq!(progress.line_index, 60);
        assert!(!progress.off_track);
        assert!((progress.race_distance - line.distance_at(60)).abs() < 0.01);
    }

    #[test]
    fn test_json_line_without_directions_stays_on_track() {
        // Первый сегмент идёт по +X, direction в JSON не задан
        let json = r#"[
            {"position": [0.0, 0.0, 0.0]},
            {"position": [20.0, 0.0, 0.0]},
            {"position": [20.0, 0.0, 20.0]},
            {"position": [0.0, 0.0, 20.0]}
        ]"#;
        let line = RacingLine::from_json(json).expect("valid json");
        let mut progress = TrackProgress::default();

        let went_off = advance_progress(&line, &mut progress, Vec3::new(8.0, 0.0, 0.0), 2.0);

        assert!(!went_off);
        assert!(!progress.off_track);
        assert_eq!(progress.line_index, 0);
        assert!((progress.race_distance - 8.0).abs() < 1e-4, "distance {}", progress.race_distance);
        assert!(progress.lateral_offset.abs() < 1e-4, "lateral {}", progress.lateral_offset);
    }
}
