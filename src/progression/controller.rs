//! The progression controller.

use super::{LevelEvent, ProgressionConfig, ProgressionStatistics, ProgressionTier};
use crate::level::seconds;
use crate::{
    Collaborators, FactionSnapshot, GamePhase, GameplaySignal, GenerationRequest, Generator,
    GlobalGameState, Level, LevelFactory, LevelState, LevelStep, LevelTypeSelector, LevelTypeTag,
    OnslaughtError, OnslaughtResult, RosterSnapshot, SpawnCoordinator,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

/// Owns the progression tier and the level registry, and routes ticks and gameplay
/// signals to the current level.
///
/// The registry is append-only. After every generation its length equals the tier,
/// and the level for tier `n` sits at index `n - 1`. Only that level ever receives
/// updates.
#[derive(Debug)]
pub struct ProgressionController<S: SpawnCoordinator> {
    config: ProgressionConfig,
    tier: ProgressionTier,
    registry: Vec<Level>,
    spawner: S,
    collaborators: Collaborators,
    selector: LevelTypeSelector,
    factory: LevelFactory,
    forced_level_type: Option<LevelTypeTag>,
    rng: StdRng,
    outbox: Vec<LevelEvent>,
    statistics: ProgressionStatistics,
}

impl<S: SpawnCoordinator> ProgressionController<S> {
    /// Creates a controller. No level is generated until [`Self::generate_next_level`].
    ///
    /// # Errors
    ///
    /// Fails when the configuration does not validate.
    pub fn new(config: ProgressionConfig, spawner: S, collaborators: Collaborators) -> OnslaughtResult<Self> {
        config.validate()?;
        let forced_level_type = config.forced_level_type()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let factory = LevelFactory::with_comet_timings(
            config.comet_objective_delay_seconds,
            config.comet_round_seconds,
        );

        log::info!(
            "Progression starting at tier {} (seed {:?}, forced type {:?})",
            config.starting_tier,
            config.seed,
            forced_level_type
        );

        Ok(Self {
            tier: config.starting_tier,
            config,
            registry: Vec::new(),
            spawner,
            collaborators,
            selector: LevelTypeSelector::new(),
            factory,
            forced_level_type,
            rng,
            outbox: Vec::new(),
            statistics: ProgressionStatistics::new(),
        })
    }

    /// Generates the level for the current tier and appends it to the registry.
    ///
    /// When progression starts beyond tier 1 the earlier tiers are generated too and
    /// immediately skipped, so registry indices keep matching tiers.
    ///
    /// # Errors
    ///
    /// [`OnslaughtError::InvalidState`] if the current tier already has a level, or any
    /// generation error. Nothing is appended on failure.
    pub fn generate_next_level(&mut self) -> OnslaughtResult<&Level> {
        if self.registry.len() >= self.tier.index() + 1 {
            return Err(OnslaughtError::InvalidState(format!(
                "tier {} already has a level",
                self.tier
            )));
        }

        let mut generated = Vec::new();
        for value in self.registry.len() + 1..=self.tier.index() + 1 {
            let tier = ProgressionTier::try_new(value as i64)?;
            generated.push(self.build_level(tier)?);
        }

        let current = self.tier;
        for mut level in generated {
            if level.tier() != current {
                level.skip();
            }
            log::info!("Generated {} level for tier {}", level.tag(), level.tier());
            self.publish(LevelEvent::LevelGenerated {
                id: level.id(),
                tier: level.tier(),
                tag: level.tag(),
            });
            self.registry.push(level);
        }

        self.current_level()
            .ok_or_else(|| OnslaughtError::InvalidState("registry is empty".to_string()))
    }

    /// Activates the current level.
    ///
    /// # Errors
    ///
    /// Fails unless the game is in [`GamePhase::LevelIn`] and the current level is
    /// Pending.
    pub fn start_level(&mut self) -> OnslaughtResult<()> {
        let phase = self.collaborators.game_state.current_state();
        let index = self.tier.index();
        let level = self.registry.get_mut(index).ok_or_else(|| {
            OnslaughtError::InvalidState(format!("no level generated for tier {}", self.tier))
        })?;

        let mut fresh = Vec::new();
        let result = level.start(&mut self.spawner, phase, &mut fresh);
        self.publish_all(fresh);
        result
    }

    /// Advances the game by one frame.
    ///
    /// Does nothing unless the game is in [`GamePhase::LevelIn`] and the current level
    /// is Active. Completes the level when it reports it is done.
    pub fn update(&mut self, dt: Duration) -> OnslaughtResult<LevelStep> {
        if self.collaborators.game_state.current_state() != GamePhase::LevelIn {
            return Ok(LevelStep::Continue);
        }
        let index = self.tier.index();
        let Some(level) = self.registry.get_mut(index) else {
            return Ok(LevelStep::Continue);
        };
        if level.state() != LevelState::Active {
            return Ok(LevelStep::Continue);
        }

        let sequence_events = self.spawner.advance(dt);
        let mut fresh = Vec::new();
        let step = level.update(dt, &sequence_events, &mut self.spawner, &mut fresh);
        self.publish_all(fresh);

        if step == LevelStep::Complete {
            self.complete_level()?;
        }
        Ok(step)
    }

    /// Routes a gameplay signal to the current level, completing it if that finishes it.
    pub fn notify(&mut self, signal: GameplaySignal) -> OnslaughtResult<LevelStep> {
        let index = self.tier.index();
        let Some(level) = self.registry.get_mut(index) else {
            return Ok(LevelStep::Continue);
        };

        let mut fresh = Vec::new();
        let step = level.notify(signal, &mut self.spawner, &mut fresh);
        self.publish_all(fresh);

        if step == LevelStep::Complete {
            self.complete_level()?;
        }
        Ok(step)
    }

    /// Completes the current level and advances progression.
    ///
    /// In order: cancels the level's spawn activity, increments the tier, generates
    /// the next level and moves the game to [`GamePhase::LevelEnd`].
    pub fn complete_level(&mut self) -> OnslaughtResult<()> {
        let index = self.tier.index();
        let level = self.registry.get_mut(index).ok_or_else(|| {
            OnslaughtError::InvalidState(format!("no level generated for tier {}", self.tier))
        })?;
        level.complete(&mut self.spawner)?;

        let completed = LevelEvent::LevelCompleted {
            id: level.id(),
            tier: level.tier(),
            tag: level.tag(),
            currency: level.params().currency_drop(),
            elapsed_seconds: level.elapsed().as_secs_f32(),
        };
        self.publish(completed);

        self.tier = self.tier.next();
        self.generate_next_level()?;
        self.collaborators.game_state.change_state(GamePhase::LevelEnd);
        log::info!("Progression advanced to tier {}", self.tier);
        Ok(())
    }

    /// Current tier; the level at this tier is the one being played.
    pub fn progression_tier(&self) -> ProgressionTier {
        self.tier
    }

    /// Every level generated so far, indexed by tier - 1.
    pub fn level_registry(&self) -> &[Level] {
        &self.registry
    }

    /// The level for the current tier, once generated.
    pub fn current_level(&self) -> Option<&Level> {
        self.registry.get(self.tier.index())
    }

    /// Takes every event published since the last drain.
    pub fn drain_events(&mut self) -> Vec<LevelEvent> {
        std::mem::take(&mut self.outbox)
    }

    /// Totals aggregated from every published event.
    pub fn statistics(&self) -> &ProgressionStatistics {
        &self.statistics
    }

    /// Get the configuration the controller was built with.
    pub fn config(&self) -> &ProgressionConfig {
        &self.config
    }

    /// Get the spawn coordinator.
    pub fn spawner(&self) -> &S {
        &self.spawner
    }

    /// Get the spawn coordinator mutably.
    pub fn spawner_mut(&mut self) -> &mut S {
        &mut self.spawner
    }

    /// Get the global game state.
    pub fn game_state(&self) -> &dyn GlobalGameState {
        self.collaborators.game_state.as_ref()
    }

    /// Get the global game state mutably, e.g. to enter `LevelIn`.
    pub fn game_state_mut(&mut self) -> &mut dyn GlobalGameState {
        self.collaborators.game_state.as_mut()
    }

    fn build_level(&mut self, tier: ProgressionTier) -> OnslaughtResult<Level> {
        let factions = FactionSnapshot::capture(self.collaborators.factions.as_ref());
        let roster = RosterSnapshot::capture(self.collaborators.roster.as_ref());
        let mut request = GenerationRequest::new(tier, factions, roster);
        if let Some(tag) = self.forced_level_type {
            request = request.with_tag(tag);
        }

        let tag = self.selector.generate(&request, &mut self.rng)?;
        self.selector.validate(&tag, &request)?;
        let request = request.with_tag(tag);
        let bundle = self.factory.generate(&request, &mut self.rng)?;
        log::debug!(
            "{} produced {} bundle for tier {}",
            self.factory.generator_type(),
            bundle.tag(),
            tier
        );

        Ok(Level::new(
            tier,
            bundle,
            seconds(self.config.degraded_level_timeout_seconds),
        ))
    }

    fn publish(&mut self, event: LevelEvent) {
        self.statistics.update_from_event(&event);
        self.outbox.push(event);
    }

    fn publish_all(&mut self, events: Vec<LevelEvent>) {
        for event in events {
            self.publish(event);
        }
    }
}
