//! Tests for driver profile, temperament and tuning.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::super::profile::{DriverProfile, Personality};
    use super::super::state::ContactResponse;
    use super::super::temperament::{AggressionStage, Mood, Temperament};
    use super::super::tuning::RacerTuning;
    use crate::error::RacerAIError;

    #[test]
    fn test_profile_defaults_validate() {
        let profile = DriverProfile::default();
        assert_eq!(profile.personality, Personality::Veteran);
        assert!(profile.validate().is_ok());

        for personality in [
            Personality::Aggressive,
            Personality::Defensive,
            Personality::Calculated,
            Personality::Unpredictable,
            Personality::Rookie,
            Personality::Veteran,
            Personality::Rival,
        ] {
            let preset = DriverProfile::preset("test", personality);
            assert!(preset.validate().is_ok(), "{:?} preset invalid", personality);
        }
    }

    #[test]
    fn test_min_following_gap_from_proximity_tolerance() {
        let mut profile = DriverProfile::default();
        profile.aggression.proximity_tolerance = 0.0;
        assert_eq!(profile.min_following_gap(), 1.5);
        profile.aggression.proximity_tolerance = 1.0;
        assert_eq!(profile.min_following_gap(), 0.5);
    }

    #[test]
    fn test_contact_response_by_severity() {
        let profile = DriverProfile::preset("Kaito", Personality::Aggressive);
        assert_eq!(profile.contact_response(0.2), ContactResponse::Mirror);
        assert_eq!(profile.contact_response(0.9), ContactResponse::Retaliate);
    }

    #[test]
    fn test_profile_from_json() {
        let json = r#"{
            "name": "Nova",
            "personality": "Rookie",
            "skill": { "skill_level": 0.4 }
        }"#;

        let profile = DriverProfile::from_json(json).expect("valid profile");
        assert_eq!(profile.name, "Nova");
        assert_eq!(profile.personality, Personality::Rookie);
        assert_eq!(profile.skill.skill_level, 0.4);
        // Остальное - default
        assert_eq!(profile.skill.consistency, 0.7);

        let invalid = r#"{ "aggression": { "risk_taking": 1.5 } }"#;
        assert!(matches!(
            DriverProfile::from_json(invalid),
            Err(RacerAIError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_with_difficulty_clamps() {
        let profile = DriverProfile::preset("Ace", Personality::Veteran);
        let hard = profile.with_difficulty(1.5);

        assert_eq!(hard.skill.skill_level, 1.0);
        assert_eq!(hard.speed.base_speed_percent, 1.1);

        let easy = profile.with_difficulty(0.5);
        assert!(easy.skill.mistake_frequency > profile.skill.mistake_frequency);
        assert_eq!(easy.speed.base_speed_percent, 0.5);
    }

    #[test]
    fn test_contact_escalation_and_grudge() {
        let profile = DriverProfile::default();
        let offender = Entity::from_raw(7);
        let mut temperament = Temperament::default();

        // 1.0 · 0.3 · 1.5 (intentional) = 0.45 → Elevated
        temperament.record_contact(&profile, offender, 1.0, false, true);
        assert!((temperament.accumulated_aggression() - 0.45).abs() < 1e-5);
        assert_eq!(temperament.stage(), AggressionStage::Elevated);
        assert_eq!(temperament.grudge_target(), Some(offender));
        assert!(temperament.has_grudge_against(offender));

        // Повторный контакт усиливается (count = 2 → ×1.4)
        temperament.record_contact(&profile, offender, 1.0, false, true);
        assert_eq!(temperament.contacts()[0].count, 2);
        assert!(temperament.accumulated_aggression() > 1.0);
        assert_eq!(temperament.stage(), AggressionStage::Rage);
        assert_eq!(temperament.grudge_intensity(offender), 1.0);
    }

    #[test]
    fn test_rage_cools_down_after_five_seconds() {
        let profile = DriverProfile::default();
        let mut temperament = Temperament::default();
        let offender = Entity::from_raw(3);

        temperament.record_contact(&profile, offender, 1.0, false, true);
        temperament.record_contact(&profile, offender, 1.0, false, true);
        assert_eq!(temperament.stage(), AggressionStage::Rage);

        for _ in 0..(6 * 60) {
            temperament.update_aggression(&profile, 1.0 / 60.0, 2, false, false);
        }

        // Остывание: Rage → Maximum, дальше стадия пересчитывается по 0.7 (High)
        assert!(temperament.stage() < AggressionStage::Rage);
        assert!((temperament.accumulated_aggression() - 0.7).abs() < 1e-5);
    }

    #[test]
    fn test_grudge_expires() {
        let mut profile = DriverProfile::default();
        profile.aggression.grudge_memory_duration = 2.0;
        let mut temperament = Temperament::default();
        let offender = Entity::from_raw(5);

        temperament.record_contact(&profile, offender, 0.8, false, false);
        assert!(temperament.has_grudge_against(offender));

        for _ in 0..(3 * 60) {
            temperament.update_aggression(&profile, 1.0 / 60.0, 3, false, false);
        }

        assert!(!temperament.has_grudge_against(offender));
        assert_eq!(temperament.grudge_target(), None);
    }

    #[test]
    fn test_mood_reacts_to_lost_positions() {
        let profile = DriverProfile::default();
        let mut temperament = Temperament::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        // Первое обновление запоминает позицию
        temperament.update_mood(&profile, 1.0, 2, &mut rng);
        // Потеряли 3 позиции за секунду
        temperament.update_mood(&profile, 1.0, 5, &mut rng);
        assert_eq!(temperament.mood(), Mood::Frustrated);

        // Потеряли ещё 5 → Desperate
        temperament.update_mood(&profile, 1.0, 10, &mut rng);
        assert_eq!(temperament.mood(), Mood::Desperate);
        assert!(temperament.effective_aggression(&profile) > profile.aggression.aggression);
        assert!(temperament.effective_skill(&profile) < profile.skill.skill_level);
    }

    #[test]
    fn test_mood_waits_for_interval() {
        let profile = DriverProfile::default();
        let mut temperament = Temperament::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        temperament.update_mood(&profile, 1.0, 1, &mut rng);
        temperament.update_mood(&profile, 0.5, 8, &mut rng);
        assert_eq!(temperament.mood(), Mood::Neutral);
    }

    #[test]
    fn test_effective_behaviors_by_personality() {
        let rookie = DriverProfile::preset("Rook", Personality::Rookie);
        let temperament = Temperament::default();
        let behaviors = temperament.effective_behaviors(&rookie);
        assert!(behaviors.brake_point_bias <= -0.3);
        assert!(behaviors.side_by_side_willingness <= 0.3);
    }

    #[test]
    fn test_tuning_defaults_and_validation() {
        let tuning = RacerTuning::default();
        assert_eq!(tuning.steering_look_ahead, 15.0);
        assert_eq!(tuning.speed_look_ahead, 30.0);
        assert_eq!(tuning.steering_p_gain, 2.0);
        assert!(tuning.validate().is_ok());

        let parsed = RacerTuning::from_json(r#"{ "perception_radius": 80.0 }"#).expect("valid tuning");
        assert_eq!(parsed.perception_radius, 80.0);
        assert_eq!(parsed.slipstream_range, 25.0);

        let invalid = RacerTuning::from_json(r#"{ "caution_speed_factor": 0.0 }"#);
        assert!(matches!(invalid, Err(RacerAIError::InvalidTuning(_))));
    }
}
