//! Tests for starting grid (slots, entries).

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use super::super::{grid_transform, GridEntry, GRID_LANE_OFFSET, GRID_ROW_SPACING};
    use crate::ai::components::{DriverProfile, Personality};
    use crate::components::VehicleSpec;
    use crate::track::{oval_centerline, RacingLine, RacingLineBuilder};

    fn oval() -> RacingLine {
        RacingLineBuilder::default()
            .build(&oval_centerline(200.0, 50.0, 5.0))
            .expect("oval builds")
    }

    #[test]
    fn test_grid_slots_behind_start_two_wide() {
        let line = oval();
        let start = line.point(0);

        let left = grid_transform(&line, 0);
        let right = grid_transform(&line, 1);
        let second_row = grid_transform(&line, 2);

        // Старт в -Z: решётка сзади (z больше), пары по бокам линии
        assert!(left.translation.z > start.position.z);
        assert!((left.translation.distance(right.translation) - 2.0 * GRID_LANE_OFFSET).abs() < 0.5);
        assert!(left.translation.x < right.translation.x);
        assert!(second_row.translation.distance(start.position) > GRID_ROW_SPACING * 1.5);

        // Смотрят вдоль линии
        assert!(left.forward().as_vec3().dot(Vec3::NEG_Z) > 0.9);
    }

    #[test]
    fn test_grid_entry_builders() {
        let fast = VehicleSpec {
            max_speed: 90.0,
            ..Default::default()
        };
        let entry = GridEntry::ai("Razor", Some(DriverProfile::preset("Razor", Personality::Aggressive)))
            .with_spec(fast)
            .with_difficulty(1.3)
            .with_rubber_banding(false);

        let driver = entry.driver.as_ref().expect("AI entry has driver");
        assert_eq!(entry.spec.max_speed, 90.0);
        assert_eq!(driver.difficulty, 1.3);
        assert!(!driver.rubber_banding);
        assert_eq!(driver.profile.as_ref().map(|p| p.name.as_str()), Some("Razor"));

        // Игрок: без водителя, builder'ы AI не влияют
        let player = GridEntry::player("You").with_difficulty(1.5);
        assert!(player.driver.is_none());
    }
}
