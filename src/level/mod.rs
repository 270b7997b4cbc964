//! # Level Module
//!
//! The level entity and its lifecycle.
//!
//! A [`Level`] owns one [`ParameterBundle`] and walks a one-way state machine:
//!
//! ```text
//! Pending --start--> Active --complete--> Completed
//! ```
//!
//! While Active it turns scheduler events and gameplay signals into progress, and
//! reports through [`LevelStep::Complete`] once its type-specific goal is met. The
//! spawn coordinator is passed into every call; a level never holds on to it.

mod choreography;

use crate::{
    FactionTag, GamePhase, LevelEvent, LevelTypeTag, OnslaughtError, OnslaughtResult,
    ParameterBundle, ProgressionTier, SequenceEvent, SequenceHandle, SpawnCoordinator,
    TimerSignal,
};
use choreography::Progress;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Unique identifier for a generated level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LevelId(pub Uuid);

impl LevelId {
    /// Creates a new random level ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LevelId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelState {
    /// Generated, waiting to be started
    Pending,
    /// Being played
    Active,
    /// Finished; terminal
    Completed,
    /// Never played because progression started at a later tier; terminal
    Skipped,
}

/// What a level wants the controller to do after a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelStep {
    Continue,
    /// The level met its goal and should be completed
    Complete,
}

/// Gameplay outcomes reported by the rest of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameplaySignal {
    EnemyDestroyed,
    InvaderDestroyed,
    BossDefeated,
    CometDestroyed,
    /// A faction won the invasion in progress
    FactionInvasionWon(FactionTag),
}

/// One generated encounter.
///
/// Deliberately not `Clone`: the registry holds exactly one instance per tier.
#[derive(Debug)]
pub struct Level {
    id: LevelId,
    tier: ProgressionTier,
    params: ParameterBundle,
    state: LevelState,
    elapsed: Duration,
    sequences: Vec<SequenceHandle>,
    progress: Progress,
    degraded: Option<String>,
    degraded_timeout: Duration,
    timed_out: bool,
    spawned_units: u32,
}

impl Level {
    /// Creates a pending level.
    pub fn new(tier: ProgressionTier, params: ParameterBundle, degraded_timeout: Duration) -> Self {
        let progress = Progress::for_bundle(&params);
        Self {
            id: LevelId::new(),
            tier,
            params,
            state: LevelState::Pending,
            elapsed: Duration::ZERO,
            sequences: Vec::new(),
            progress,
            degraded: None,
            degraded_timeout,
            timed_out: false,
            spawned_units: 0,
        }
    }

    /// Unique id of this level.
    pub fn id(&self) -> LevelId {
        self.id
    }

    /// Tier the level was generated for.
    pub fn tier(&self) -> ProgressionTier {
        self.tier
    }

    /// Level type, taken from the bundle.
    pub fn tag(&self) -> LevelTypeTag {
        self.params.tag()
    }

    /// Parameters the level was built from.
    pub fn params(&self) -> &ParameterBundle {
        &self.params
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LevelState {
        self.state
    }

    /// Time spent Active.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Sequences and timers this level started that may still be running.
    pub fn owned_sequences(&self) -> &[SequenceHandle] {
        &self.sequences
    }

    /// Reason the level lost its choreography, if it did.
    pub fn degraded_reason(&self) -> Option<&str> {
        self.degraded.as_deref()
    }

    /// Units spawned on behalf of this level.
    pub fn spawned_units(&self) -> u32 {
        self.spawned_units
    }

    /// Hostiles reported destroyed while Active.
    pub fn destroyed_units(&self) -> u32 {
        self.progress.destroyed()
    }

    /// Whether the level's objective has been activated.
    pub fn objective_active(&self) -> bool {
        self.progress.objective_active()
    }

    /// Moves the level from Pending to Active and kicks off its choreography.
    ///
    /// Spawn failures do not fail the call; they put the level on the degraded path.
    ///
    /// # Errors
    ///
    /// [`OnslaughtError::InvalidTransition`] unless Pending, and
    /// [`OnslaughtError::InvalidState`] unless the game is in [`GamePhase::LevelIn`].
    pub fn start<S: SpawnCoordinator + ?Sized>(
        &mut self,
        spawner: &mut S,
        phase: GamePhase,
        events: &mut Vec<LevelEvent>,
    ) -> OnslaughtResult<()> {
        if self.state != LevelState::Pending {
            return Err(OnslaughtError::InvalidTransition(format!(
                "cannot start tier {} level from {:?}",
                self.tier, self.state
            )));
        }
        if phase != GamePhase::LevelIn {
            return Err(OnslaughtError::InvalidState(format!(
                "levels start only in LevelIn, game is in {phase:?}"
            )));
        }

        self.state = LevelState::Active;
        log::info!("Starting {} level at tier {} ({})", self.tag(), self.tier, self.id);
        events.push(LevelEvent::LevelStarted {
            id: self.id,
            tier: self.tier,
            tag: self.tag(),
        });

        if let Err(err) = self.begin(spawner) {
            self.degrade(err, spawner, events);
        }
        Ok(())
    }

    /// Advances the level by one tick.
    ///
    /// `sequence_events` are whatever the spawn coordinator reported this tick; events
    /// for handles this level does not own are skipped. Anything but an Active level
    /// ignores the call.
    pub fn update<S: SpawnCoordinator + ?Sized>(
        &mut self,
        dt: Duration,
        sequence_events: &[SequenceEvent],
        spawner: &mut S,
        events: &mut Vec<LevelEvent>,
    ) -> LevelStep {
        if self.state != LevelState::Active {
            return LevelStep::Continue;
        }
        self.elapsed += dt;

        for event in sequence_events {
            if !self.sequences.contains(&event.handle()) {
                continue;
            }
            match event {
                SequenceEvent::Spawned { .. } => self.spawned_units += 1,
                SequenceEvent::Exhausted { handle } => self.release(*handle),
                SequenceEvent::TimerElapsed { handle, signal } => {
                    self.release(*handle);
                    self.on_timer(*signal, events);
                }
            }
        }

        if let Err(err) = self.tick(spawner) {
            self.degrade(err, spawner, events);
        }
        self.step()
    }

    /// Feeds a gameplay signal to the level.
    pub fn notify<S: SpawnCoordinator + ?Sized>(
        &mut self,
        signal: GameplaySignal,
        spawner: &mut S,
        events: &mut Vec<LevelEvent>,
    ) -> LevelStep {
        if self.state != LevelState::Active {
            log::trace!("Tier {} level ignores {signal:?} while {:?}", self.tier, self.state);
            return LevelStep::Continue;
        }
        if let Err(err) = self.on_signal(signal, spawner, events) {
            self.degrade(err, spawner, events);
        }
        self.step()
    }

    /// Single completion entry point: cancels everything the level owns and makes it
    /// terminal.
    pub fn complete<S: SpawnCoordinator + ?Sized>(&mut self, spawner: &mut S) -> OnslaughtResult<()> {
        if self.state != LevelState::Active {
            return Err(OnslaughtError::InvalidTransition(format!(
                "cannot complete tier {} level from {:?}",
                self.tier, self.state
            )));
        }

        for handle in self.sequences.drain(..) {
            if spawner.cancel_spawn_sequence(handle) {
                log::debug!("Tier {} level cancelled {handle}", self.tier);
            }
        }
        self.state = LevelState::Completed;
        log::info!(
            "Completed {} level at tier {} after {:.1}s",
            self.tag(),
            self.tier,
            self.elapsed.as_secs_f32()
        );
        Ok(())
    }

    /// Retires a pending level that progression started beyond.
    pub(crate) fn skip(&mut self) {
        if self.state == LevelState::Pending {
            log::debug!("Skipping tier {} {} level", self.tier, self.tag());
            self.state = LevelState::Skipped;
        }
    }

    fn step(&self) -> LevelStep {
        if self.timed_out || self.progress.is_finished(&self.params) {
            LevelStep::Complete
        } else {
            LevelStep::Continue
        }
    }

    fn release(&mut self, handle: SequenceHandle) {
        self.sequences.retain(|owned| *owned != handle);
    }

    fn launch<S: SpawnCoordinator + ?Sized>(
        &mut self,
        spawner: &mut S,
        spec: crate::SpawnSequenceSpec,
    ) -> OnslaughtResult<SequenceHandle> {
        let handle = spawner.start_spawn_sequence(spec)?;
        self.sequences.push(handle);
        Ok(handle)
    }

    fn arm<S: SpawnCoordinator + ?Sized>(
        &mut self,
        spawner: &mut S,
        delay: Duration,
        signal: TimerSignal,
    ) -> SequenceHandle {
        let handle = spawner.start_timed_sequence(delay, signal);
        self.sequences.push(handle);
        handle
    }

    /// Logs the failure and arms the fallback completion timer, once.
    fn degrade<S: SpawnCoordinator + ?Sized>(
        &mut self,
        err: OnslaughtError,
        spawner: &mut S,
        events: &mut Vec<LevelEvent>,
    ) {
        log::error!("Tier {} {} level degraded: {err}", self.tier, self.tag());
        if self.degraded.is_some() {
            return;
        }
        self.degraded = Some(err.to_string());
        events.push(LevelEvent::LevelDegraded {
            tier: self.tier,
            tag: self.tag(),
            reason: err.to_string(),
        });
        self.arm(spawner, self.degraded_timeout, TimerSignal::DegradedTimeout);
    }
}

/// Converts configured seconds to a duration, treating invalid values as zero.
pub(crate) fn seconds(value: f32) -> Duration {
    Duration::try_from_secs_f32(value).unwrap_or(Duration::ZERO)
}
