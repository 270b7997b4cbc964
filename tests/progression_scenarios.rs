//! End-to-end progression scenarios driven through the controller.

use onslaught::{
    Collaborators, FactionSnapshot, GamePhase, GameplaySignal, InMemoryGameState, LevelEvent,
    LevelFactory, LevelState, LevelStep, LevelTypeSelector, LevelTypeTag, OnslaughtResult,
    ParameterBundle, ProgressionConfig, ProgressionController, ProgressionTier, RosterSnapshot,
    SelectionDraw, SequenceScheduler, StaticFactionState, StaticRoster,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

const TICK: Duration = Duration::from_millis(100);

fn controller(config: ProgressionConfig) -> ProgressionController<SequenceScheduler> {
    ProgressionController::new(config, SequenceScheduler::new(), Collaborators::headless()).unwrap()
}

fn tier(value: i64) -> ProgressionTier {
    ProgressionTier::try_new(value).unwrap()
}

fn begin(controller: &mut ProgressionController<SequenceScheduler>) -> OnslaughtResult<()> {
    controller.game_state_mut().change_state(GamePhase::LevelIn);
    controller.start_level()?;
    controller.update(TICK)?;
    Ok(())
}

#[test]
fn test_tier_one_is_small_horde() {
    let mut controller = controller(ProgressionConfig::for_testing(1));
    let level = controller.generate_next_level().unwrap();
    match level.params() {
        ParameterBundle::Horde(horde) => {
            assert_eq!(horde.enemy_count, 3);
            assert!((horde.spawn_rate - 0.01).abs() < 1e-6);
        }
        other => panic!("expected horde, got {other:?}"),
    }
}

#[test]
fn test_tier_eleven_draws() {
    let selector = LevelTypeSelector::new();
    let factory = LevelFactory::new();
    let factions = FactionSnapshot::capture(&StaticFactionState::default());
    let roster = RosterSnapshot::capture(&StaticRoster::default());
    let mut rng = StdRng::seed_from_u64(11);

    let invasion = selector.choose(tier(11), SelectionDraw::new(0.1, 0.0).unwrap(), factions.defending);
    assert_eq!(invasion, LevelTypeTag::Invasion);
    match factory.build(invasion, tier(11), &factions, &roster, &mut rng) {
        ParameterBundle::Invasion(p) => assert_eq!(p.losing_threshold, 33),
        other => panic!("expected invasion, got {other:?}"),
    }

    let boss = selector.choose(tier(11), SelectionDraw::new(0.3, 0.6).unwrap(), factions.defending);
    assert_eq!(boss, LevelTypeTag::ShooterBoss);
}

#[test]
fn test_completing_tier_five_horde() -> OnslaughtResult<()> {
    let mut controller = controller(ProgressionConfig::for_testing(5).with_starting_tier(tier(5)));
    controller.generate_next_level()?;
    begin(&mut controller)?;

    let level = controller.current_level().unwrap();
    assert_eq!(level.tag(), LevelTypeTag::Horde);
    let owned = level.owned_sequences().to_vec();
    assert!(!owned.is_empty());

    controller.complete_level()?;

    assert_eq!(controller.progression_tier().get(), 6);
    let registry = controller.level_registry();
    assert_eq!(registry.len(), 6);
    assert_eq!(registry[4].state(), LevelState::Completed);
    assert_eq!(registry[5].state(), LevelState::Pending);
    assert_eq!(
        registry.iter().filter(|l| l.state() == LevelState::Pending).count(),
        1
    );
    for handle in owned {
        assert!(controller.spawner().cancelled().contains(&handle));
    }
    assert_eq!(controller.spawner().running_count(), 0);
    assert_eq!(controller.game_state().current_state(), GamePhase::LevelEnd);
    Ok(())
}

#[test]
fn test_progression_is_monotonic() -> OnslaughtResult<()> {
    for start in [1, 3, 9] {
        let mut controller = controller(ProgressionConfig::for_testing(start as u64).with_starting_tier(tier(start)));
        controller.generate_next_level()?;

        for completed in 1..=6 {
            begin(&mut controller)?;
            controller.complete_level()?;
            assert_eq!(controller.progression_tier().get(), start as u32 + completed);
            assert_eq!(
                controller.level_registry().len(),
                controller.progression_tier().get() as usize
            );
        }
    }
    Ok(())
}

#[test]
fn test_horde_completes_from_kills() -> OnslaughtResult<()> {
    let mut controller = controller(ProgressionConfig::for_testing(21).with_starting_tier(tier(4)));
    controller.generate_next_level()?;
    begin(&mut controller)?;

    let mut step = LevelStep::Continue;
    for _ in 0..12 {
        step = controller.notify(GameplaySignal::EnemyDestroyed)?;
    }
    assert_eq!(step, LevelStep::Complete);
    assert_eq!(controller.progression_tier().get(), 5);

    // The completed level ignores further signals and ticks.
    assert_eq!(controller.notify(GameplaySignal::EnemyDestroyed)?, LevelStep::Continue);
    assert_eq!(controller.level_registry()[3].destroyed_units(), 12);
    Ok(())
}

#[test]
fn test_comet_round_runs_to_time() -> OnslaughtResult<()> {
    let config = ProgressionConfig::for_testing(3)
        .with_starting_tier(tier(14))
        .with_forced_level_type(LevelTypeTag::Comet);
    let mut controller = controller(config);
    controller.generate_next_level()?;
    controller.game_state_mut().change_state(GamePhase::LevelIn);
    controller.start_level()?;

    let mut updates = 0;
    while controller.update(TICK)? == LevelStep::Continue {
        updates += 1;
        assert!(updates < 100, "comet round never ended");
    }

    // Round armed on the first update, 6 s at 100 ms per update.
    assert_eq!(updates, 60);
    let events = controller.drain_events();
    assert!(events.iter().any(|e| matches!(e, LevelEvent::ObjectiveActivated { .. })));
    assert!(events.iter().any(|e| matches!(
        e,
        LevelEvent::LevelCompleted { tag: LevelTypeTag::Comet, currency, .. } if *currency == 0.0
    )));
    Ok(())
}

#[test]
fn test_boss_awards_currency() -> OnslaughtResult<()> {
    let config = ProgressionConfig::for_testing(8)
        .with_starting_tier(tier(12))
        .with_forced_level_type(LevelTypeTag::SpawnerBoss);
    let mut controller = controller(config);
    controller.generate_next_level()?;
    begin(&mut controller)?;

    assert_eq!(controller.notify(GameplaySignal::BossDefeated)?, LevelStep::Complete);
    let stats = controller.statistics();
    assert_eq!(stats.bosses_defeated, 1);
    assert_eq!(stats.currency_awarded, 3000.0);
    Ok(())
}

#[test]
fn test_empty_roster_level_degrades_then_completes() -> OnslaughtResult<()> {
    let collaborators = Collaborators::new(
        InMemoryGameState::new(),
        StaticFactionState::default(),
        StaticRoster::empty(),
    );
    let mut controller =
        ProgressionController::new(ProgressionConfig::for_testing(9), SequenceScheduler::new(), collaborators)?;
    controller.generate_next_level()?;
    controller.game_state_mut().change_state(GamePhase::LevelIn);
    controller.start_level()?;

    let mut updates = 0;
    while controller.update(TICK)? == LevelStep::Continue {
        updates += 1;
        assert!(updates < 50, "degraded level never completed");
    }

    // 2 s fallback timer at 100 ms per update.
    assert_eq!(updates, 19);
    assert_eq!(controller.statistics().degraded_levels, 1);
    assert_eq!(controller.progression_tier().get(), 2);
    assert!(controller.level_registry()[0].degraded_reason().is_some());
    Ok(())
}

#[test]
fn test_thrax_defenders_get_thrax_boss() -> OnslaughtResult<()> {
    let collaborators = Collaborators::new(
        InMemoryGameState::new(),
        StaticFactionState::new(Some(onslaught::FactionTag::ThraxArmada), Vec::new()),
        StaticRoster::default(),
    );
    let config = ProgressionConfig::for_testing(10)
        .with_starting_tier(tier(30))
        .with_forced_level_type(LevelTypeTag::ThraxMultiPhaseBoss);
    let mut controller = ProgressionController::new(config, SequenceScheduler::new(), collaborators)?;
    controller.generate_next_level()?;
    begin(&mut controller)?;

    assert_eq!(controller.notify(GameplaySignal::BossDefeated)?, LevelStep::Continue);
    controller.update(TICK)?;
    assert_eq!(controller.notify(GameplaySignal::BossDefeated)?, LevelStep::Complete);

    let events = controller.drain_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, LevelEvent::BossPhaseAdvanced { phase: 2, .. })));
    Ok(())
}
