//! # Generation Module
//!
//! Procedural level generation: choosing what the player faces next and computing the
//! numbers that make it harder as progression advances.
//!
//! Generation is split in two pure steps:
//! - [`LevelTypeSelector`] turns a tier and random draws into a [`LevelTypeTag`]
//! - [`LevelFactory`] turns a tag and a tier into an immutable [`ParameterBundle`]
//!
//! Both implement [`Generator`], the seam the progression controller drives them through.

pub mod bundle;
pub mod factory;
pub mod selector;

pub use bundle::*;
pub use factory::*;
pub use selector::*;

use crate::{FactionSnapshot, OnslaughtError, OnslaughtResult, ProgressionTier, RosterSnapshot};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Discriminator selecting which encounter variant is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LevelTypeTag {
    Horde,
    Invasion,
    SpawnerBoss,
    ShooterBoss,
    SyndicatesMultiPhaseBoss,
    ThraxMultiPhaseBoss,
    Comet,
}

impl LevelTypeTag {
    /// Every level type, in declaration order.
    pub const ALL: [LevelTypeTag; 7] = [
        LevelTypeTag::Horde,
        LevelTypeTag::Invasion,
        LevelTypeTag::SpawnerBoss,
        LevelTypeTag::ShooterBoss,
        LevelTypeTag::SyndicatesMultiPhaseBoss,
        LevelTypeTag::ThraxMultiPhaseBoss,
        LevelTypeTag::Comet,
    ];

    /// Short kebab-case name used in configuration files and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            LevelTypeTag::Horde => "horde",
            LevelTypeTag::Invasion => "invasion",
            LevelTypeTag::SpawnerBoss => "spawner-boss",
            LevelTypeTag::ShooterBoss => "shooter-boss",
            LevelTypeTag::SyndicatesMultiPhaseBoss => "syndicates-boss",
            LevelTypeTag::ThraxMultiPhaseBoss => "thrax-boss",
            LevelTypeTag::Comet => "comet",
        }
    }

    /// Whether the level ends by defeating a boss.
    pub fn is_boss(self) -> bool {
        matches!(
            self,
            LevelTypeTag::SpawnerBoss
                | LevelTypeTag::ShooterBoss
                | LevelTypeTag::SyndicatesMultiPhaseBoss
                | LevelTypeTag::ThraxMultiPhaseBoss
        )
    }
}

impl fmt::Display for LevelTypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LevelTypeTag {
    type Err = OnslaughtError;

    /// Parses a level type by its short name or its variant name, ignoring case.
    ///
    /// # Examples
    ///
    /// ```
    /// use onslaught::LevelTypeTag;
    ///
    /// assert_eq!("thrax-boss".parse::<LevelTypeTag>().unwrap(), LevelTypeTag::ThraxMultiPhaseBoss);
    /// assert_eq!("ShooterBoss".parse::<LevelTypeTag>().unwrap(), LevelTypeTag::ShooterBoss);
    /// assert!("dragon".parse::<LevelTypeTag>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        LevelTypeTag::ALL
            .into_iter()
            .find(|tag| tag.name() == wanted || format!("{tag:?}").to_lowercase() == wanted)
            .ok_or_else(|| OnslaughtError::Configuration(format!("unknown level type '{s}'")))
    }
}

/// Named spatial arrangement for boss escorts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormationType {
    Circle,
    Line,
    VShape,
    Grid,
    Wedge,
    Diamond,
    Spiral,
}

impl FormationType {
    /// Every formation, indexed the way random formation draws index them.
    pub const ALL: [FormationType; 7] = [
        FormationType::Circle,
        FormationType::Line,
        FormationType::VShape,
        FormationType::Grid,
        FormationType::Wedge,
        FormationType::Diamond,
        FormationType::Spiral,
    ];

    /// Looks up a formation by draw index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// A uniform random draw in `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Draw(f32);

impl Draw {
    /// Wraps a value, rejecting anything outside `[0, 1)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use onslaught::Draw;
    ///
    /// assert!(Draw::new(0.0).is_ok());
    /// assert!(Draw::new(0.999).is_ok());
    /// assert!(Draw::new(1.0).is_err());
    /// assert!(Draw::new(f32::NAN).is_err());
    /// ```
    pub fn new(value: f32) -> OnslaughtResult<Self> {
        if (0.0..1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(OnslaughtError::Configuration(format!(
                "draw {value} outside [0, 1)"
            )))
        }
    }

    /// Samples a fresh draw.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen::<f32>())
    }

    /// Gets the raw value.
    pub fn value(self) -> f32 {
        self.0
    }
}

/// The two independent draws level selection consumes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionDraw {
    /// Picks the probability band
    pub primary: Draw,
    /// Splits the boss band between spawner and shooter bosses
    pub secondary: Draw,
}

impl SelectionDraw {
    /// Builds a selection draw from raw values.
    pub fn new(primary: f32, secondary: f32) -> OnslaughtResult<Self> {
        Ok(Self {
            primary: Draw::new(primary)?,
            secondary: Draw::new(secondary)?,
        })
    }

    /// Samples both draws independently.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            primary: Draw::sample(rng),
            secondary: Draw::sample(rng),
        }
    }
}

/// Everything a generator needs to produce one level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Tier the level is generated for
    pub tier: ProgressionTier,
    /// Level type, once chosen; `None` asks the selector to choose
    pub tag: Option<LevelTypeTag>,
    /// Faction state at generation time
    pub factions: FactionSnapshot,
    /// Roster at generation time
    pub roster: RosterSnapshot,
}

impl GenerationRequest {
    /// Creates a request that still needs a level type.
    pub fn new(tier: ProgressionTier, factions: FactionSnapshot, roster: RosterSnapshot) -> Self {
        Self {
            tier,
            tag: None,
            factions,
            roster,
        }
    }

    /// Returns the request with its level type fixed.
    pub fn with_tag(mut self, tag: LevelTypeTag) -> Self {
        self.tag = Some(tag);
        self
    }
}

/// Trait for procedural generators.
///
/// All generation steps implement this trait so the controller can drive them, and
/// validate their output, the same way.
pub trait Generator<T> {
    /// Generates content for the request.
    fn generate(&self, request: &GenerationRequest, rng: &mut StdRng) -> OnslaughtResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, request: &GenerationRequest) -> OnslaughtResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// The three primitives every scaled field is built from.
pub mod scaling {
    use rand::Rng;

    /// `base + tier * rate`, in single precision.
    pub fn linear(base: f32, tier: u32, rate: f32) -> f32 {
        base + tier as f32 * rate
    }

    /// `min(hi, max(lo, value))`.
    ///
    /// Applied in that order so a misconfigured pair with `lo > hi` still resolves to `hi`
    /// rather than panicking.
    pub fn clamp_stat(value: f32, lo: f32, hi: f32) -> f32 {
        value.max(lo).min(hi)
    }

    /// Uniform integer in the half-open range `[lo, hi)`.
    pub fn jitter<R: Rng + ?Sized>(rng: &mut R, lo: i32, hi: i32) -> i32 {
        rng.gen_range(lo..hi)
    }
}
