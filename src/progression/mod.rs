//! # Progression Module
//!
//! Tier bookkeeping, configuration and the controller that drives levels from
//! generation to completion.

pub mod controller;
pub mod events;

pub use controller::*;
pub use events::*;

use crate::{config, LevelTypeTag, OnslaughtError, OnslaughtResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Progression tier: starts at 1 and increases by one per completed level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct ProgressionTier(u32);

impl ProgressionTier {
    /// The tier every new game starts at.
    pub const FIRST: ProgressionTier = ProgressionTier(1);

    /// Creates a tier, rejecting values below 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use onslaught::ProgressionTier;
    ///
    /// assert_eq!(ProgressionTier::try_new(11).unwrap().get(), 11);
    /// assert!(ProgressionTier::try_new(0).is_err());
    /// ```
    pub fn try_new(value: i64) -> OnslaughtResult<Self> {
        if value < 1 || value > i64::from(u32::MAX) {
            return Err(OnslaughtError::RangeViolation(value));
        }
        Ok(Self(value as u32))
    }

    /// Creates a tier, clamping out-of-range values with a warning.
    pub fn clamped(value: i64) -> Self {
        Self::try_new(value).unwrap_or_else(|err| {
            let fallback = if value < 1 { Self::FIRST } else { Self(u32::MAX) };
            log::warn!("{err}; using tier {}", fallback.0);
            fallback
        })
    }

    /// The tier as a plain number.
    pub fn get(self) -> u32 {
        self.0
    }

    /// The tier after this one.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Registry index of the level generated for this tier.
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }
}

impl Default for ProgressionTier {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for ProgressionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for ProgressionTier {
    type Error = OnslaughtError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<ProgressionTier> for u32 {
    fn from(tier: ProgressionTier) -> Self {
        tier.0
    }
}

/// Configuration for a progression run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    /// Seed for level selection and jitter; entropy when unset
    pub seed: Option<u64>,
    /// Tier the first played level is generated for
    pub starting_tier: ProgressionTier,
    /// Seconds a Comet round lasts once started
    pub comet_round_seconds: f32,
    /// Seconds before a Comet level activates its objective
    pub comet_objective_delay_seconds: f32,
    /// Seconds a degraded level waits before completing anyway
    pub degraded_level_timeout_seconds: f32,
    /// Level type generated at every tier instead of a random choice
    pub forced_level_type: Option<String>,
}

impl ProgressionConfig {
    /// Creates a configuration with the game's default timings.
    ///
    /// # Examples
    ///
    /// ```
    /// use onslaught::ProgressionConfig;
    ///
    /// let config = ProgressionConfig::new(42);
    /// assert_eq!(config.seed, Some(42));
    /// assert_eq!(config.starting_tier.get(), 1);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Creates a configuration with short timings for tests.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            starting_tier: ProgressionTier::FIRST,
            comet_round_seconds: 6.0,
            comet_objective_delay_seconds: 0.5,
            degraded_level_timeout_seconds: 2.0,
            forced_level_type: None,
        }
    }

    /// Returns the configuration starting at `tier`.
    pub fn with_starting_tier(mut self, tier: ProgressionTier) -> Self {
        self.starting_tier = tier;
        self
    }

    /// Returns the configuration generating only `tag` levels.
    pub fn with_forced_level_type(mut self, tag: LevelTypeTag) -> Self {
        self.forced_level_type = Some(tag.name().to_string());
        self
    }

    /// Parses the forced level type, if one is set.
    pub fn forced_level_type(&self) -> OnslaughtResult<Option<LevelTypeTag>> {
        self.forced_level_type
            .as_deref()
            .map(|name| name.parse::<LevelTypeTag>())
            .transpose()
    }

    /// Checks timings are usable and the forced level type is known.
    pub fn validate(&self) -> OnslaughtResult<()> {
        let timings = [
            ("comet_round_seconds", self.comet_round_seconds),
            ("comet_objective_delay_seconds", self.comet_objective_delay_seconds),
            ("degraded_level_timeout_seconds", self.degraded_level_timeout_seconds),
        ];
        for (name, value) in timings {
            if !value.is_finite() || value < 0.0 {
                return Err(OnslaughtError::Configuration(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        self.forced_level_type()?;
        Ok(())
    }

    /// Loads and validates a configuration from a JSON file.
    pub fn load_from_json(path: impl AsRef<Path>) -> OnslaughtResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::debug!("Loaded progression config from {}", path.as_ref().display());
        Self::from_json_str(&text)
    }

    /// Parses and validates a configuration from JSON text.
    pub fn from_json_str(json: &str) -> OnslaughtResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration to pretty JSON.
    pub fn to_json(&self) -> OnslaughtResult<String> {
        serde_json::to_string_pretty(self).map_err(OnslaughtError::from)
    }
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            seed: None,
            starting_tier: ProgressionTier::FIRST,
            comet_round_seconds: config::COMET_ROUND_SECONDS,
            comet_objective_delay_seconds: config::COMET_OBJECTIVE_DELAY_SECONDS,
            degraded_level_timeout_seconds: config::DEGRADED_LEVEL_TIMEOUT_SECONDS,
            forced_level_type: None,
        }
    }
}
