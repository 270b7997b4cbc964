//! Parameter bundles: the immutable numbers a level is built from.

use super::{FormationType, LevelTypeTag};
use crate::{FactionTag, OnslaughtError, OnslaughtResult, ShipId, SpawnPoint};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Horde level: a single stream of defending ships.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HordeParams {
    pub enemy_count: u32,
    /// Seconds between spawns
    pub spawn_rate: f32,
    pub defending_faction: FactionTag,
    pub defending_ships: Vec<ShipId>,
}

/// Invasion level: defenders stream in while an invading faction pushes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvasionParams {
    /// Seconds between defending spawns
    pub spawn_rate_defending: f32,
    /// Invader losses that end the level
    pub losing_threshold: u32,
    /// Integer ratio `1 / 2`, which evaluates to zero
    pub spawn_amount_ratio: u32,
    pub defending_faction: FactionTag,
    pub invading_faction: FactionTag,
    pub defending_ships: Vec<ShipId>,
    pub invading_ships: Vec<ShipId>,
}

/// Comet event: a timed survival round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CometParams {
    pub comet_count: u32,
    pub spawn_rate: f32,
    /// Seconds before the objective is activated
    pub objective_delay: f32,
    /// Seconds the round lasts once started
    pub round_length: f32,
}

/// Stats shared by every boss.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BossStats {
    pub health: f32,
    pub speed: f32,
    pub stop_distance: f32,
    pub attack_range: f32,
    pub currency_drop: f32,
}

/// Bullet pattern of a shooting boss.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weaponry {
    pub bullet_amount: u32,
    pub bullet_damage: f32,
    pub bullet_speed: f32,
    pub fire_rate: f32,
    /// Spread in degrees
    pub fire_angle: f32,
}

/// Escort formation accompanying a boss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormationSpec {
    pub formation: FormationType,
    pub size: u32,
    pub radius: f32,
    pub ship_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnerBossParams {
    pub boss_name: String,
    pub stats: BossStats,
    pub ships_per_spawn: u32,
    /// Seconds between minion batches
    pub spawn_rate: f32,
    pub minion_ships: Vec<ShipId>,
    pub spawn_points: Vec<SpawnPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShooterBossParams {
    pub boss_name: String,
    pub stats: BossStats,
    pub weaponry: Weaponry,
    pub formation: FormationSpec,
    pub spawn_points: Vec<SpawnPoint>,
}

/// Boss fought in consecutive phases, one spawned after the other is defeated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiPhaseBossParams {
    pub faction: FactionTag,
    /// Boss fielded in each phase, in order
    pub phases: Vec<String>,
    pub stats: BossStats,
    pub weaponry: Weaponry,
    pub formation: FormationSpec,
    /// Shared by every phase
    pub spawn_points: Vec<SpawnPoint>,
}

/// Tag-specific parameters computed once when a level is generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterBundle {
    Horde(HordeParams),
    Invasion(InvasionParams),
    SpawnerBoss(SpawnerBossParams),
    ShooterBoss(ShooterBossParams),
    SyndicatesMultiPhaseBoss(MultiPhaseBossParams),
    ThraxMultiPhaseBoss(MultiPhaseBossParams),
    Comet(CometParams),
}

/// Integer jitter ranges bundles are checked against.
pub(crate) const SHOOTER_FIRE_RATE_RANGE: RangeInclusive<i32> = 1..=4;
pub(crate) const THRAX_FIRE_RATE_RANGE: RangeInclusive<i32> = 1..=2;
pub(crate) const THRAX_FIRE_ANGLE_RANGE: RangeInclusive<i32> = 15..=20;

impl ParameterBundle {
    /// Gets the level type this bundle belongs to.
    pub fn tag(&self) -> LevelTypeTag {
        match self {
            ParameterBundle::Horde(_) => LevelTypeTag::Horde,
            ParameterBundle::Invasion(_) => LevelTypeTag::Invasion,
            ParameterBundle::SpawnerBoss(_) => LevelTypeTag::SpawnerBoss,
            ParameterBundle::ShooterBoss(_) => LevelTypeTag::ShooterBoss,
            ParameterBundle::SyndicatesMultiPhaseBoss(_) => LevelTypeTag::SyndicatesMultiPhaseBoss,
            ParameterBundle::ThraxMultiPhaseBoss(_) => LevelTypeTag::ThraxMultiPhaseBoss,
            ParameterBundle::Comet(_) => LevelTypeTag::Comet,
        }
    }

    /// Boss stats, for boss levels.
    pub fn boss_stats(&self) -> Option<&BossStats> {
        match self {
            ParameterBundle::SpawnerBoss(p) => Some(&p.stats),
            ParameterBundle::ShooterBoss(p) => Some(&p.stats),
            ParameterBundle::SyndicatesMultiPhaseBoss(p) | ParameterBundle::ThraxMultiPhaseBoss(p) => {
                Some(&p.stats)
            }
            _ => None,
        }
    }

    /// Currency awarded when the level completes; zero for non-boss levels.
    pub fn currency_drop(&self) -> f32 {
        self.boss_stats().map(|stats| stats.currency_drop).unwrap_or(0.0)
    }

    /// Checks the bundle is internally consistent.
    ///
    /// Empty rosters and boss names pass; they are reported when the level tries to
    /// spawn them.
    pub fn validate(&self) -> OnslaughtResult<()> {
        match self {
            ParameterBundle::Horde(p) => check_real("spawn_rate", p.spawn_rate),
            ParameterBundle::Invasion(p) => check_real("spawn_rate_defending", p.spawn_rate_defending),
            ParameterBundle::Comet(p) => {
                check_real("spawn_rate", p.spawn_rate)?;
                check_real("objective_delay", p.objective_delay)?;
                check_real("round_length", p.round_length)
            }
            ParameterBundle::SpawnerBoss(p) => {
                check_stats(&p.stats)?;
                check_real("spawn_rate", p.spawn_rate)
            }
            ParameterBundle::ShooterBoss(p) => {
                check_stats(&p.stats)?;
                check_weaponry(&p.weaponry)?;
                check_jitter("fire_rate", p.weaponry.fire_rate, SHOOTER_FIRE_RATE_RANGE)?;
                check_formation(&p.formation)
            }
            ParameterBundle::SyndicatesMultiPhaseBoss(p) => check_multi_phase(p),
            ParameterBundle::ThraxMultiPhaseBoss(p) => {
                check_multi_phase(p)?;
                check_jitter("fire_rate", p.weaponry.fire_rate, THRAX_FIRE_RATE_RANGE)?;
                check_jitter("fire_angle", p.weaponry.fire_angle, THRAX_FIRE_ANGLE_RANGE)
            }
        }
    }
}

fn check_real(field: &str, value: f32) -> OnslaughtResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(OnslaughtError::Configuration(format!(
            "{field} must be finite and non-negative, got {value}"
        )))
    }
}

fn check_jitter(field: &str, value: f32, range: RangeInclusive<i32>) -> OnslaughtResult<()> {
    if value.fract() == 0.0 && range.contains(&(value as i32)) {
        Ok(())
    } else {
        Err(OnslaughtError::Configuration(format!(
            "{field} {value} outside {range:?}"
        )))
    }
}

fn check_stats(stats: &BossStats) -> OnslaughtResult<()> {
    check_real("health", stats.health)?;
    check_real("speed", stats.speed)?;
    check_real("stop_distance", stats.stop_distance)?;
    check_real("attack_range", stats.attack_range)?;
    check_real("currency_drop", stats.currency_drop)
}

fn check_weaponry(weaponry: &Weaponry) -> OnslaughtResult<()> {
    check_real("bullet_damage", weaponry.bullet_damage)?;
    check_real("bullet_speed", weaponry.bullet_speed)?;
    check_real("fire_rate", weaponry.fire_rate)?;
    check_real("fire_angle", weaponry.fire_angle)
}

fn check_formation(formation: &FormationSpec) -> OnslaughtResult<()> {
    check_real("formation_radius", formation.radius)
}

fn check_multi_phase(params: &MultiPhaseBossParams) -> OnslaughtResult<()> {
    if params.phases.is_empty() {
        return Err(OnslaughtError::Configuration(
            "multi-phase boss needs at least one phase".to_string(),
        ));
    }
    check_stats(&params.stats)?;
    check_weaponry(&params.weaponry)?;
    check_formation(&params.formation)
}
