//! Difficulty scaling: every tag-specific formula lives here.

use super::scaling::{clamp_stat, jitter, linear};
use super::*;
use crate::{config, FactionSnapshot, OnslaughtError, OnslaughtResult, ProgressionTier, RosterSnapshot};
use rand::Rng;

/// Builds parameter bundles from a level type and a tier.
///
/// Apart from the explicitly jittered fields, every value is a clamped linear function
/// of the tier. Integer fields saturate, so any valid tier up to `u32::MAX` builds.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelFactory {
    comet_objective_delay: f32,
    comet_round_length: f32,
}

impl LevelFactory {
    /// Creates a factory using the default Comet timings.
    pub fn new() -> Self {
        Self::with_comet_timings(
            config::COMET_OBJECTIVE_DELAY_SECONDS,
            config::COMET_ROUND_SECONDS,
        )
    }

    /// Creates a factory with custom Comet objective delay and round length, in seconds.
    pub fn with_comet_timings(objective_delay: f32, round_length: f32) -> Self {
        Self {
            comet_objective_delay: objective_delay,
            comet_round_length: round_length,
        }
    }

    /// Computes the bundle for `tag` at `tier`.
    ///
    /// # Examples
    ///
    /// ```
    /// use onslaught::{FactionSnapshot, LevelFactory, LevelTypeTag, ParameterBundle, ProgressionTier, RosterSnapshot};
    /// use rand::SeedableRng;
    ///
    /// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
    /// let bundle = LevelFactory::new().build(
    ///     LevelTypeTag::Horde,
    ///     ProgressionTier::FIRST,
    ///     &FactionSnapshot::default(),
    ///     &RosterSnapshot::default(),
    ///     &mut rng,
    /// );
    /// match bundle {
    ///     ParameterBundle::Horde(horde) => assert_eq!(horde.enemy_count, 3),
    ///     other => panic!("unexpected bundle {other:?}"),
    /// }
    /// ```
    pub fn build<R: Rng + ?Sized>(
        &self,
        tag: LevelTypeTag,
        tier: ProgressionTier,
        factions: &FactionSnapshot,
        roster: &RosterSnapshot,
        rng: &mut R,
    ) -> ParameterBundle {
        let t = tier.get();
        match tag {
            LevelTypeTag::Horde => ParameterBundle::Horde(HordeParams {
                enemy_count: t.saturating_mul(3),
                spawn_rate: linear(0.0, t, 0.01).min(0.5),
                defending_faction: factions.defending_or_default(),
                defending_ships: roster.defending_ships.clone(),
            }),
            LevelTypeTag::Invasion => ParameterBundle::Invasion(InvasionParams {
                spawn_rate_defending: 0.5,
                losing_threshold: t.saturating_mul(3),
                spawn_amount_ratio: 1 / 2,
                defending_faction: factions.defending_or_default(),
                invading_faction: factions.invader_or_default(),
                defending_ships: roster.defending_ships.clone(),
                invading_ships: roster.invading_ships.clone(),
            }),
            LevelTypeTag::Comet => ParameterBundle::Comet(CometParams {
                comet_count: 300,
                spawn_rate: 0.5,
                objective_delay: self.comet_objective_delay,
                round_length: self.comet_round_length,
            }),
            LevelTypeTag::SpawnerBoss => {
                let health = linear(0.0, t, 1000.0);
                ParameterBundle::SpawnerBoss(SpawnerBossParams {
                    boss_name: roster.spawner_boss_name.clone(),
                    stats: BossStats {
                        health,
                        speed: linear(0.0, t, 2.0).max(20.0),
                        stop_distance: clamp_stat(linear(0.0, t, 2.5), 80.0, 120.0),
                        attack_range: clamp_stat(linear(0.0, t, 2.5), 100.0, 120.0),
                        currency_drop: health / 4.0,
                    },
                    ships_per_spawn: t / 3 + 1,
                    spawn_rate: linear(3.0, t, -0.1).max(0.1),
                    minion_ships: roster.defending_ships.clone(),
                    spawn_points: roster.boss_spawn_points.clone(),
                })
            }
            LevelTypeTag::ShooterBoss => {
                let health = linear(0.0, t, 1000.0);
                let bullet_amount = t / 3;
                let fire_rate = jitter(rng, 1, 5) as f32;
                let formation = random_formation(rng);
                ParameterBundle::ShooterBoss(ShooterBossParams {
                    boss_name: roster.shooter_boss_name.clone(),
                    stats: BossStats {
                        health,
                        speed: linear(0.0, t, 0.5).max(20.0),
                        stop_distance: clamp_stat(linear(0.0, t, 2.5), 60.0, 100.0),
                        attack_range: clamp_stat(linear(0.0, t, 2.4), 80.0, 120.0),
                        currency_drop: health / 4.0,
                    },
                    weaponry: Weaponry {
                        bullet_amount,
                        bullet_damage: linear(0.0, t, 2.0),
                        bullet_speed: clamp_stat(t as f32, 10.0, 30.0),
                        fire_rate,
                        fire_angle: bullet_amount.saturating_mul(4) as f32,
                    },
                    formation: FormationSpec {
                        formation,
                        size: t.saturating_mul(5).min(25),
                        radius: clamp_stat(linear(0.0, t, 2.0), 25.0, 50.0),
                        ship_names: roster.formation_ship_names.clone(),
                    },
                    spawn_points: roster.boss_spawn_points.clone(),
                })
            }
            LevelTypeTag::SyndicatesMultiPhaseBoss => {
                let health = linear(0.0, t, 3000.0);
                let bullet_amount = t.max(10);
                ParameterBundle::SyndicatesMultiPhaseBoss(MultiPhaseBossParams {
                    faction: crate::FactionTag::Syndicates,
                    phases: vec![config::SYNDICATES_BOSS_NAME.to_string()],
                    stats: BossStats {
                        health,
                        speed: clamp_stat(t as f32, 10.0, 60.0),
                        stop_distance: clamp_stat(linear(0.0, t, 2.5), 50.0, 80.0),
                        attack_range: clamp_stat(linear(0.0, t, 2.4), 70.0, 100.0),
                        currency_drop: health / 4.0,
                    },
                    weaponry: Weaponry {
                        bullet_amount,
                        bullet_damage: linear(0.0, t, 2.5).max(50.0),
                        bullet_speed: clamp_stat(t as f32, 10.0, 60.0),
                        fire_rate: 3.0,
                        fire_angle: bullet_amount.saturating_mul(4) as f32,
                    },
                    formation: FormationSpec {
                        formation: FormationType::Circle,
                        size: 10,
                        radius: 30.0,
                        ship_names: config::SYNDICATES_ESCORT_SHIPS
                            .iter()
                            .map(|name| name.to_string())
                            .collect(),
                    },
                    spawn_points: roster.boss_spawn_points.clone(),
                })
            }
            LevelTypeTag::ThraxMultiPhaseBoss => {
                let health = linear(0.0, t, 15000.0).max(500_000.0);
                let fire_rate = jitter(rng, 1, 3) as f32;
                let fire_angle = jitter(rng, 15, 21) as f32;
                let formation = random_formation(rng);
                ParameterBundle::ThraxMultiPhaseBoss(MultiPhaseBossParams {
                    faction: crate::FactionTag::ThraxArmada,
                    phases: config::THRAX_BOSS_PHASES
                        .iter()
                        .map(|name| name.to_string())
                        .collect(),
                    stats: BossStats {
                        health,
                        speed: linear(0.0, t, 0.5).max(20.0),
                        stop_distance: clamp_stat(linear(0.0, t, 2.0), 90.0, 120.0),
                        attack_range: clamp_stat(linear(0.0, t, 4.0), 150.0, 180.0),
                        currency_drop: health / 2.0,
                    },
                    weaponry: Weaponry {
                        bullet_amount: t.saturating_mul(2).clamp(30, 60),
                        bullet_damage: linear(0.0, t, 5.0).max(50.0),
                        bullet_speed: clamp_stat(t as f32, 30.0, 40.0),
                        fire_rate,
                        fire_angle,
                    },
                    formation: FormationSpec {
                        formation,
                        size: t.saturating_mul(5).min(50),
                        radius: clamp_stat(linear(0.0, t, 2.0), 25.0, 50.0),
                        ship_names: roster.formation_ship_names.clone(),
                    },
                    spawn_points: roster.boss_spawn_points.clone(),
                })
            }
        }
    }
}

impl Default for LevelFactory {
    fn default() -> Self {
        Self::new()
    }
}

fn random_formation<R: Rng + ?Sized>(rng: &mut R) -> FormationType {
    let index = jitter(rng, 0, FormationType::ALL.len() as i32) as usize;
    FormationType::from_index(index).unwrap_or(FormationType::Circle)
}

impl Generator<ParameterBundle> for LevelFactory {
    fn generate(&self, request: &GenerationRequest, rng: &mut StdRng) -> OnslaughtResult<ParameterBundle> {
        let tag = request.tag.ok_or_else(|| {
            OnslaughtError::Configuration("level factory needs a chosen level type".to_string())
        })?;
        let bundle = self.build(tag, request.tier, &request.factions, &request.roster, rng);
        self.validate(&bundle, request)?;
        Ok(bundle)
    }

    fn validate(&self, content: &ParameterBundle, request: &GenerationRequest) -> OnslaughtResult<()> {
        if let Some(tag) = request.tag {
            if content.tag() != tag {
                return Err(OnslaughtError::Configuration(format!(
                    "built {} bundle for a {} request",
                    content.tag(),
                    tag
                )));
            }
        }
        content.validate()
    }

    fn generator_type(&self) -> &'static str {
        "LevelFactory"
    }
}
