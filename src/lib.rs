//! # Onslaught
//!
//! Procedural level generation and progression control for a wave-based arcade shooter.
//!
//! ## Architecture Overview
//!
//! The crate is organised around four cooperating pieces:
//!
//! - **Selection**: [`LevelTypeSelector`] maps a progression tier and a random draw to a
//!   [`LevelTypeTag`] using fixed probability bands
//! - **Scaling**: [`LevelFactory`] turns a tag and a tier into an immutable
//!   [`ParameterBundle`], which encodes the whole difficulty curve
//! - **Lifecycle**: [`Level`] owns one bundle and walks Pending → Active → Completed,
//!   delegating spawn choreography to a [`SpawnCoordinator`]
//! - **Progression**: [`ProgressionController`] owns the tier and the append-only level
//!   registry, routes ticks to the active level and advances on completion
//!
//! Everything outside that core (spawning, presentation, faction bookkeeping) is reached
//! through the collaborator traits in [`collaborators`], injected at construction.
//!
//! ```
//! use onslaught::{
//!     Collaborators, GamePhase, ProgressionConfig, ProgressionController, SequenceScheduler,
//! };
//!
//! let config = ProgressionConfig::for_testing(7);
//! let mut controller =
//!     ProgressionController::new(config, SequenceScheduler::new(), Collaborators::headless())
//!         .unwrap();
//! controller.generate_next_level().unwrap();
//! controller.game_state_mut().change_state(GamePhase::LevelIn);
//! controller.start_level().unwrap();
//! assert_eq!(controller.progression_tier().get(), 1);
//! ```

pub mod collaborators;
pub mod generation;
pub mod level;
pub mod progression;

pub use collaborators::*;
pub use generation::*;
pub use level::*;
pub use progression::*;

/// Core error type for the level generation and progression engine.
#[derive(thiserror::Error, Debug)]
pub enum OnslaughtError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Unknown level type or a parameter bundle that failed validation
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Progression tier outside the valid range
    #[error("Tier out of range: {0} (tiers start at 1)")]
    RangeViolation(i64),

    /// Required external state was not available
    #[error("Missing collaborator state: {0}")]
    MissingCollaborator(String),

    /// Lifecycle transition not permitted from the current state
    #[error("Invalid level transition: {0}")]
    InvalidTransition(String),

    /// Controller or game state is not in a state that allows the call
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// The spawn coordinator refused a sequence
    #[error("Spawn sequence rejected: {0}")]
    SpawnRejected(String),
}

/// Result type used throughout the Onslaught codebase.
pub type OnslaughtResult<T> = Result<T, OnslaughtError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Highest tier that always generates a Horde level
    pub const HORDE_ONLY_TIER_CEILING: u32 = 10;

    /// Seconds a Comet round lasts once it has started
    pub const COMET_ROUND_SECONDS: f32 = 60.0;

    /// Seconds after a Comet level starts before its objective is activated
    pub const COMET_OBJECTIVE_DELAY_SECONDS: f32 = 3.0;

    /// Name of the objective activated by Comet levels
    pub const COMET_OBJECTIVE_NAME: &str = "Comet";

    /// Unit spawned by Comet levels
    pub const COMET_UNIT_NAME: &str = "Comet";

    /// Seconds a level that lost its choreography waits before completing anyway
    pub const DEGRADED_LEVEL_TIMEOUT_SECONDS: f32 = 30.0;

    /// Boss fielded by the Syndicates multi-phase encounter
    pub const SYNDICATES_BOSS_NAME: &str = "SyndicatesFinalBoss";

    /// Escort roster of the Syndicates multi-phase encounter
    pub const SYNDICATES_ESCORT_SHIPS: [&str; 4] =
        ["MediumShip", "MediumShip2", "SmallShip", "MeleeShip"];

    /// Boss phases fielded by the Thrax multi-phase encounter, in order
    pub const THRAX_BOSS_PHASES: [&str; 2] = ["Thrax", "ThraxPhase2"];

    /// Frames per second assumed by the headless simulator
    pub const TARGET_FPS: u64 = 60;
}
