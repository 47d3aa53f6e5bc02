//! Tests for race standings (order, gaps).

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use super::super::{compute_standings, StandingEntry, MIN_GAP_SPEED};

    fn entry(index: u32, race_distance: f32, speed: f32) -> StandingEntry {
        StandingEntry {
            vehicle: Entity::from_raw(index),
            race_distance,
            speed,
        }
    }

    #[test]
    fn test_standings_order_by_distance() {
        let standings = compute_standings(&[
            entry(1, 100.0, 40.0),
            entry(2, 300.0, 40.0),
            entry(3, 200.0, 40.0),
        ]);

        let order: Vec<u32> = standings.iter().map(|(vehicle, _)| vehicle.index()).collect();
        assert_eq!(order, vec![2, 3, 1]);

        for (rank, (_, standing)) in standings.iter().enumerate() {
            assert_eq!(standing.position, rank as u32 + 1);
            assert_eq!(standing.total, 3);
        }
    }

    #[test]
    fn test_standings_gaps_in_seconds() {
        let standings = compute_standings(&[
            entry(1, 300.0, 40.0),
            entry(2, 260.0, 40.0),
            entry(3, 100.0, 20.0),
        ]);

        let leader = standings[0].1;
        assert_eq!(leader.gap_to_leader, 0.0);
        assert_eq!(leader.gap_to_ahead, None);
        assert_eq!(leader.gap_to_behind, Some(1.0)); // 40 м / 40 m/s

        let second = standings[1].1;
        assert_eq!(second.gap_to_leader, 1.0);
        assert_eq!(second.gap_to_ahead, Some(1.0));
        assert_eq!(second.gap_to_behind, Some(8.0)); // 160 м / 20 m/s

        let last = standings[2].1;
        assert_eq!(last.gap_to_leader, 10.0);
        assert_eq!(last.gap_to_behind, None);
    }

    #[test]
    fn test_standings_gap_uses_min_speed_on_grid() {
        let standings = compute_standings(&[entry(1, 0.0, 0.0), entry(2, -20.0, 0.0)]);

        assert_eq!(standings[1].1.gap_to_leader, 20.0 / MIN_GAP_SPEED);
    }

    #[test]
    fn test_standings_ties_broken_by_entity() {
        let standings = compute_standings(&[entry(5, 50.0, 30.0), entry(2, 50.0, 30.0)]);

        assert_eq!(standings[0].0, Entity::from_raw(2));
        assert_eq!(standings[1].1.gap_to_leader, 0.0);
    }
}
