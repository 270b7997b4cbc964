//! # Collaborators Module
//!
//! Contracts for the systems this crate drives but does not own.
//!
//! The progression engine never reaches for global singletons. Everything it needs from
//! the rest of the game is injected through the traits below:
//! - [`SpawnCoordinator`] runs spawn choreography and timers
//! - [`FactionState`] reports which factions are defending and invading
//! - [`GlobalGameState`] owns the coarse game phase
//! - [`RosterProvider`] supplies the opaque ship and boss identifiers levels spawn
//!
//! Headless implementations live in [`headless`] and [`scheduler`].

pub mod headless;
pub mod scheduler;

pub use headless::*;
pub use scheduler::*;

use crate::{OnslaughtError, OnslaughtResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// The two factions the game knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FactionTag {
    /// The Syndicates; also the fallback when faction state is missing
    #[default]
    Syndicates,
    /// The Thrax Armada
    ThraxArmada,
}

impl FactionTag {
    /// Returns the opposing faction.
    ///
    /// # Examples
    ///
    /// ```
    /// use onslaught::FactionTag;
    ///
    /// assert_eq!(FactionTag::Syndicates.rival(), FactionTag::ThraxArmada);
    /// assert_eq!(FactionTag::ThraxArmada.rival(), FactionTag::Syndicates);
    /// ```
    pub fn rival(self) -> Self {
        match self {
            FactionTag::Syndicates => FactionTag::ThraxArmada,
            FactionTag::ThraxArmada => FactionTag::Syndicates,
        }
    }
}

/// Coarse game phase owned by the global game state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Front-end menus
    Menu,
    /// A level is being played
    LevelIn,
    /// Between levels (shop, summary screens)
    LevelEnd,
    /// Game paused
    Paused,
    /// Player lost
    GameOver,
}

/// Opaque ship identifier handed out by the roster provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShipId(pub String);

impl ShipId {
    /// Creates a ship identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Gets the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A world-space location where bosses may appear.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub x: f32,
    pub y: f32,
}

impl SpawnPoint {
    /// Creates a new spawn point.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Runs spawn choreography on behalf of levels.
///
/// Sequences are resumable state advanced once per tick by [`SpawnCoordinator::advance`];
/// nothing here may block. Timers carry a [`TimerSignal`] that is handed back to the
/// owning level when they elapse, in place of a callback.
pub trait SpawnCoordinator {
    /// Starts a spawn sequence and returns a handle that can cancel it.
    fn start_spawn_sequence(&mut self, spec: SpawnSequenceSpec) -> OnslaughtResult<SequenceHandle>;

    /// Cancels a running sequence or timer. Returns `false` if the handle was not running.
    fn cancel_spawn_sequence(&mut self, handle: SequenceHandle) -> bool;

    /// Starts a one-shot timer that reports `signal` once `delay` has elapsed.
    fn start_timed_sequence(&mut self, delay: Duration, signal: TimerSignal) -> SequenceHandle;

    /// Advances every running sequence by `dt` and reports what happened.
    fn advance(&mut self, dt: Duration) -> Vec<SequenceEvent>;

    /// Checks whether a handle still refers to a running sequence or timer.
    fn is_running(&self, handle: SequenceHandle) -> bool;
}

/// Reports which factions are currently defending and invading.
pub trait FactionState {
    /// The faction defending the player's sector, if one is configured.
    fn defending_faction(&self) -> Option<FactionTag>;

    /// Invading factions in priority order.
    fn invading_factions(&self) -> Vec<FactionTag>;
}

/// Owner of the coarse game phase.
pub trait GlobalGameState {
    /// Gets the current phase.
    fn current_state(&self) -> GamePhase;

    /// Moves the game to a new phase.
    fn change_state(&mut self, new_state: GamePhase);
}

/// Supplies the identifiers that levels spawn. Values are passed through uninterpreted.
pub trait RosterProvider {
    /// Ships fielded by the defending faction.
    fn determine_defending_ships(&self) -> Vec<ShipId>;

    /// Ships fielded by the invading faction.
    fn determine_invading_ships(&self) -> Vec<ShipId>;

    /// Ships used to build boss escort formations.
    fn formation_ship_names(&self) -> Vec<String>;

    /// Name of the boss used by spawner boss levels.
    fn spawner_boss_name(&self) -> String;

    /// Name of the boss used by shooter boss levels.
    fn shooter_boss_name(&self) -> String;

    /// Locations bosses may appear at.
    fn boss_spawn_points(&self) -> Vec<SpawnPoint> {
        Vec::new()
    }
}

/// Point-in-time copy of the faction state consumed by the level factory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionSnapshot {
    pub defending: Option<FactionTag>,
    pub invading: Vec<FactionTag>,
}

impl FactionSnapshot {
    /// Captures the current faction state.
    pub fn capture(state: &dyn FactionState) -> Self {
        Self {
            defending: state.defending_faction(),
            invading: state.invading_factions(),
        }
    }

    /// Gets the defending faction, failing when none is configured.
    pub fn defending(&self) -> OnslaughtResult<FactionTag> {
        self.defending.ok_or_else(|| {
            OnslaughtError::MissingCollaborator("no defending faction configured".to_string())
        })
    }

    /// Gets the primary invading faction, failing when none is configured.
    pub fn primary_invader(&self) -> OnslaughtResult<FactionTag> {
        self.invading.first().copied().ok_or_else(|| {
            OnslaughtError::MissingCollaborator("no invading faction configured".to_string())
        })
    }

    /// Defending faction, falling back to [`FactionTag::default`] with a warning.
    pub fn defending_or_default(&self) -> FactionTag {
        self.defending().unwrap_or_else(|err| {
            log::warn!("{err}; falling back to {:?}", FactionTag::default());
            FactionTag::default()
        })
    }

    /// Primary invader, falling back to the defending faction's rival with a warning.
    pub fn invader_or_default(&self) -> FactionTag {
        self.primary_invader().unwrap_or_else(|err| {
            let fallback = self.defending_or_default().rival();
            log::warn!("{err}; falling back to {fallback:?}");
            fallback
        })
    }
}

/// Point-in-time copy of the roster consumed by the level factory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterSnapshot {
    pub defending_ships: Vec<ShipId>,
    pub invading_ships: Vec<ShipId>,
    pub formation_ship_names: Vec<String>,
    pub spawner_boss_name: String,
    pub shooter_boss_name: String,
    pub boss_spawn_points: Vec<SpawnPoint>,
}

impl RosterSnapshot {
    /// Captures everything the roster provider currently offers.
    pub fn capture(roster: &dyn RosterProvider) -> Self {
        Self {
            defending_ships: roster.determine_defending_ships(),
            invading_ships: roster.determine_invading_ships(),
            formation_ship_names: roster.formation_ship_names(),
            spawner_boss_name: roster.spawner_boss_name(),
            shooter_boss_name: roster.shooter_boss_name(),
            boss_spawn_points: roster.boss_spawn_points(),
        }
    }
}

/// Bundle of injected collaborators owned by the progression controller.
pub struct Collaborators {
    pub game_state: Box<dyn GlobalGameState>,
    pub factions: Box<dyn FactionState>,
    pub roster: Box<dyn RosterProvider>,
}

impl Collaborators {
    /// Creates a collaborator bundle from concrete implementations.
    pub fn new(
        game_state: impl GlobalGameState + 'static,
        factions: impl FactionState + 'static,
        roster: impl RosterProvider + 'static,
    ) -> Self {
        Self {
            game_state: Box::new(game_state),
            factions: Box::new(factions),
            roster: Box::new(roster),
        }
    }

    /// Collaborators backed by the in-memory implementations, for tests and tools.
    pub fn headless() -> Self {
        Self::new(
            InMemoryGameState::new(),
            StaticFactionState::default(),
            StaticRoster::default(),
        )
    }
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators")
            .field("game_state", &self.game_state.current_state())
            .field("defending", &self.factions.defending_faction())
            .finish_non_exhaustive()
    }
}
