//! Property tests for level selection and parameter scaling.

use onslaught::{
    Draw, FactionSnapshot, FactionTag, LevelCategory, LevelFactory, LevelTypeSelector,
    LevelTypeTag, ParameterBundle, ProgressionTier, RosterSnapshot, SelectionDraw, StaticRoster,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn faction() -> impl Strategy<Value = Option<FactionTag>> {
    prop_oneof![
        Just(None),
        Just(Some(FactionTag::Syndicates)),
        Just(Some(FactionTag::ThraxArmada)),
    ]
}

fn tag() -> impl Strategy<Value = LevelTypeTag> {
    (0..LevelTypeTag::ALL.len()).prop_map(|index| LevelTypeTag::ALL[index])
}

fn build(tag: LevelTypeTag, tier: u32, seed: u64) -> ParameterBundle {
    let mut rng = StdRng::seed_from_u64(seed);
    LevelFactory::new().build(
        tag,
        ProgressionTier::try_new(i64::from(tier)).unwrap(),
        &FactionSnapshot::default(),
        &RosterSnapshot::capture(&StaticRoster::default()),
        &mut rng,
    )
}

/// Fields that never shrink as the tier grows.
fn monotone_fields(bundle: &ParameterBundle) -> Vec<f32> {
    let mut fields = Vec::new();
    if let Some(stats) = bundle.boss_stats() {
        fields.extend([
            stats.health,
            stats.speed,
            stats.stop_distance,
            stats.attack_range,
            stats.currency_drop,
        ]);
    }
    match bundle {
        ParameterBundle::Horde(p) => fields.extend([p.enemy_count as f32, p.spawn_rate]),
        ParameterBundle::Invasion(p) => fields.push(p.losing_threshold as f32),
        ParameterBundle::SpawnerBoss(p) => fields.push(p.ships_per_spawn as f32),
        ParameterBundle::ShooterBoss(p) => fields.extend([
            p.weaponry.bullet_amount as f32,
            p.weaponry.bullet_damage,
            p.weaponry.bullet_speed,
            p.formation.size as f32,
            p.formation.radius,
        ]),
        ParameterBundle::SyndicatesMultiPhaseBoss(p) | ParameterBundle::ThraxMultiPhaseBoss(p) => {
            fields.extend([
                p.weaponry.bullet_amount as f32,
                p.weaponry.bullet_damage,
                p.weaponry.bullet_speed,
                p.formation.size as f32,
                p.formation.radius,
            ])
        }
        ParameterBundle::Comet(_) => {}
    }
    fields
}

proptest! {
    #[test]
    fn early_tiers_always_horde(
        tier in 1u32..=10,
        primary in 0.0f32..1.0,
        secondary in 0.0f32..1.0,
        defending in faction(),
    ) {
        let draw = SelectionDraw::new(primary, secondary).unwrap();
        let tier = ProgressionTier::try_new(i64::from(tier)).unwrap();
        prop_assert_eq!(LevelTypeSelector::new().choose(tier, draw, defending), LevelTypeTag::Horde);
    }

    #[test]
    fn late_tiers_follow_bands(
        tier in 11u32..5_000,
        primary in 0.0f32..1.0,
        secondary in 0.0f32..1.0,
        defending in faction(),
    ) {
        let draw = SelectionDraw::new(primary, secondary).unwrap();
        let tier = ProgressionTier::try_new(i64::from(tier)).unwrap();
        let tag = LevelTypeSelector::new().choose(tier, draw, defending);

        let expected = match LevelTypeSelector::category(Draw::new(primary).unwrap()) {
            LevelCategory::Invasion => vec![LevelTypeTag::Invasion],
            LevelCategory::Boss => vec![LevelTypeTag::SpawnerBoss, LevelTypeTag::ShooterBoss],
            LevelCategory::MultiPhaseBoss => vec![
                LevelTypeTag::SyndicatesMultiPhaseBoss,
                LevelTypeTag::ThraxMultiPhaseBoss,
            ],
            LevelCategory::Comet => vec![LevelTypeTag::Comet],
            LevelCategory::Horde => vec![LevelTypeTag::Horde],
        };
        prop_assert!(expected.contains(&tag));

        if primary < 0.2 {
            prop_assert_eq!(tag, LevelTypeTag::Invasion);
        } else if primary < 0.4 {
            prop_assert_eq!(tag == LevelTypeTag::SpawnerBoss, secondary < 0.5);
        } else if primary < 0.55 {
            let thrax = defending == Some(FactionTag::ThraxArmada);
            prop_assert_eq!(tag == LevelTypeTag::ThraxMultiPhaseBoss, thrax);
        } else if primary < 0.575 {
            prop_assert_eq!(tag, LevelTypeTag::Comet);
        } else {
            prop_assert_eq!(tag, LevelTypeTag::Horde);
        }
    }

    #[test]
    fn same_seed_same_bundle(tag in tag(), tier in 1u32..2_000, seed in any::<u64>()) {
        prop_assert_eq!(build(tag, tier, seed), build(tag, tier, seed));
    }

    #[test]
    fn generated_bundles_validate(tag in tag(), tier in 1u32..10_000, seed in any::<u64>()) {
        let bundle = build(tag, tier, seed);
        prop_assert_eq!(bundle.tag(), tag);
        prop_assert!(bundle.validate().is_ok());
    }

    #[test]
    fn scaled_fields_never_decrease(tag in tag(), tier in 1u32..5_000, seed in any::<u64>()) {
        let lower = monotone_fields(&build(tag, tier, seed));
        let higher = monotone_fields(&build(tag, tier + 1, seed));
        prop_assert_eq!(lower.len(), higher.len());
        for (index, (low, high)) in lower.iter().zip(&higher).enumerate() {
            prop_assert!(low <= high, "{} field {} fell from {} to {} at tier {}", tag, index, low, high, tier);
        }
    }

    #[test]
    fn spawner_spawn_rate_never_increases(tier in 1u32..5_000) {
        let rate = |tier| match build(LevelTypeTag::SpawnerBoss, tier, 0) {
            ParameterBundle::SpawnerBoss(p) => p.spawn_rate,
            _ => f32::NAN,
        };
        prop_assert!(rate(tier + 1) <= rate(tier));
    }

    #[test]
    fn spawner_stop_distance_is_clamped(tier in 1u32..100_000) {
        match build(LevelTypeTag::SpawnerBoss, tier, 0) {
            ParameterBundle::SpawnerBoss(p) => {
                prop_assert!((80.0..=120.0).contains(&p.stats.stop_distance));
                prop_assert!((100.0..=120.0).contains(&p.stats.attack_range));
                prop_assert!(p.spawn_rate >= 0.1);
            }
            other => prop_assert!(false, "unexpected bundle {:?}", other),
        }
    }

    #[test]
    fn thrax_jitters_stay_in_range(tier in 1u32..5_000, seed in any::<u64>()) {
        match build(LevelTypeTag::ThraxMultiPhaseBoss, tier, seed) {
            ParameterBundle::ThraxMultiPhaseBoss(p) => {
                prop_assert!(p.weaponry.fire_rate == 1.0 || p.weaponry.fire_rate == 2.0);
                prop_assert!((15.0..=20.0).contains(&p.weaponry.fire_angle));
                prop_assert_eq!(p.weaponry.fire_angle.fract(), 0.0);
                prop_assert!(p.stats.health >= 500_000.0);
                prop_assert!(p.formation.size <= 50);
            }
            other => prop_assert!(false, "unexpected bundle {:?}", other),
        }
    }
}
