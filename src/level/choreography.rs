//! Per-type spawn choreography and completion conditions.

use super::{seconds, GameplaySignal, Level};
use crate::{
    config, FactionTag, LevelEvent, OnslaughtResult, ParameterBundle, SpawnCoordinator, SpawnPoint,
    SpawnSequenceSpec, TimerSignal, UnitRole,
};
use std::time::Duration;

/// Private progress state, one variant per level family.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Progress {
    Horde {
        destroyed: u32,
    },
    Invasion {
        invaders_lost: u32,
        won_by: Option<FactionTag>,
    },
    Boss {
        defeated: bool,
    },
    MultiPhase {
        phase: usize,
        defeated: bool,
    },
    Comet {
        objective_active: bool,
        round_started: bool,
        round_over: bool,
        destroyed: u32,
    },
}

impl Progress {
    pub(crate) fn for_bundle(params: &ParameterBundle) -> Self {
        match params {
            ParameterBundle::Horde(_) => Progress::Horde { destroyed: 0 },
            ParameterBundle::Invasion(_) => Progress::Invasion {
                invaders_lost: 0,
                won_by: None,
            },
            ParameterBundle::SpawnerBoss(_) | ParameterBundle::ShooterBoss(_) => {
                Progress::Boss { defeated: false }
            }
            ParameterBundle::SyndicatesMultiPhaseBoss(_) | ParameterBundle::ThraxMultiPhaseBoss(_) => {
                Progress::MultiPhase {
                    phase: 0,
                    defeated: false,
                }
            }
            ParameterBundle::Comet(_) => Progress::Comet {
                objective_active: false,
                round_started: false,
                round_over: false,
                destroyed: 0,
            },
        }
    }

    /// Hostiles the player has destroyed so far.
    pub(crate) fn destroyed(&self) -> u32 {
        match self {
            Progress::Horde { destroyed } | Progress::Comet { destroyed, .. } => *destroyed,
            Progress::Invasion { invaders_lost, .. } => *invaders_lost,
            Progress::Boss { defeated } | Progress::MultiPhase { defeated, .. } => u32::from(*defeated),
        }
    }

    pub(crate) fn objective_active(&self) -> bool {
        matches!(self, Progress::Comet { objective_active: true, .. })
    }

    pub(crate) fn is_finished(&self, params: &ParameterBundle) -> bool {
        match (self, params) {
            (Progress::Horde { destroyed }, ParameterBundle::Horde(p)) => *destroyed >= p.enemy_count,
            (
                Progress::Invasion {
                    invaders_lost,
                    won_by,
                },
                ParameterBundle::Invasion(p),
            ) => *invaders_lost >= p.losing_threshold || won_by.is_some(),
            (Progress::Boss { defeated }, _) | (Progress::MultiPhase { defeated, .. }, _) => *defeated,
            (Progress::Comet { round_over, .. }, _) => *round_over,
            _ => false,
        }
    }
}

fn names<T: ToString>(items: &[T]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

impl Level {
    /// Sequences started as soon as the level becomes Active.
    fn opening(&self) -> (Vec<SpawnSequenceSpec>, Vec<(Duration, TimerSignal)>) {
        match &self.params {
            ParameterBundle::Horde(p) => (
                vec![SpawnSequenceSpec::stream(
                    UnitRole::Enemy,
                    names(&p.defending_ships),
                    p.enemy_count,
                    seconds(p.spawn_rate),
                )],
                Vec::new(),
            ),
            ParameterBundle::Invasion(p) => {
                let cadence = seconds(p.spawn_rate_defending);
                (
                    vec![
                        SpawnSequenceSpec::repeating(
                            UnitRole::Defender,
                            names(&p.defending_ships),
                            1,
                            cadence,
                        ),
                        SpawnSequenceSpec::stream(
                            UnitRole::Invader,
                            names(&p.invading_ships),
                            p.losing_threshold,
                            cadence,
                        ),
                    ],
                    Vec::new(),
                )
            }
            ParameterBundle::SpawnerBoss(p) => (
                vec![
                    SpawnSequenceSpec::single(UnitRole::Boss, p.boss_name.clone(), p.spawn_points.clone()),
                    SpawnSequenceSpec::repeating(
                        UnitRole::Minion,
                        names(&p.minion_ships),
                        p.ships_per_spawn,
                        seconds(p.spawn_rate),
                    ),
                ],
                Vec::new(),
            ),
            ParameterBundle::ShooterBoss(p) => (
                vec![
                    SpawnSequenceSpec::single(UnitRole::Boss, p.boss_name.clone(), p.spawn_points.clone()),
                    SpawnSequenceSpec::burst(
                        UnitRole::Escort,
                        p.formation.ship_names.clone(),
                        p.formation.size,
                    ),
                ],
                Vec::new(),
            ),
            ParameterBundle::SyndicatesMultiPhaseBoss(p) | ParameterBundle::ThraxMultiPhaseBoss(p) => {
                let first = p.phases.first().cloned().unwrap_or_default();
                (
                    vec![
                        SpawnSequenceSpec::single(UnitRole::Boss, first, p.spawn_points.clone()),
                        SpawnSequenceSpec::burst(
                            UnitRole::Escort,
                            p.formation.ship_names.clone(),
                            p.formation.size,
                        ),
                    ],
                    Vec::new(),
                )
            }
            ParameterBundle::Comet(p) => (
                vec![SpawnSequenceSpec::stream(
                    UnitRole::Comet,
                    vec![config::COMET_UNIT_NAME.to_string()],
                    p.comet_count,
                    seconds(p.spawn_rate),
                )],
                vec![(seconds(p.objective_delay), TimerSignal::ActivateObjective)],
            ),
        }
    }

    /// Launches the opening choreography. Every sequence is attempted; the first
    /// rejection is returned.
    pub(super) fn begin<S: SpawnCoordinator + ?Sized>(&mut self, spawner: &mut S) -> OnslaughtResult<()> {
        let (specs, timers) = self.opening();
        let mut failure = None;

        for spec in specs {
            if let Err(err) = self.launch(spawner, spec) {
                failure.get_or_insert(err);
            }
        }
        for (delay, signal) in timers {
            self.arm(spawner, delay, signal);
        }

        failure.map_or(Ok(()), Err)
    }

    /// Per-tick work that is not driven by scheduler events.
    pub(super) fn tick<S: SpawnCoordinator + ?Sized>(&mut self, spawner: &mut S) -> OnslaughtResult<()> {
        let round_length = match (&mut self.progress, &self.params) {
            (Progress::Comet { round_started, .. }, ParameterBundle::Comet(p)) if !*round_started => {
                *round_started = true;
                Some(seconds(p.round_length))
            }
            _ => None,
        };

        if let Some(length) = round_length {
            log::debug!("Comet round started at tier {}, ends in {length:?}", self.tier);
            self.arm(spawner, length, TimerSignal::EndRound);
        }
        Ok(())
    }

    pub(super) fn on_timer(&mut self, signal: TimerSignal, events: &mut Vec<LevelEvent>) {
        match (signal, &mut self.progress) {
            (TimerSignal::DegradedTimeout, _) => {
                log::warn!("Tier {} level hit its degraded timeout", self.tier);
                self.timed_out = true;
            }
            (TimerSignal::ActivateObjective, Progress::Comet { objective_active, .. }) => {
                *objective_active = true;
                events.push(LevelEvent::ObjectiveActivated {
                    tier: self.tier,
                    name: config::COMET_OBJECTIVE_NAME.to_string(),
                });
            }
            (TimerSignal::EndRound, Progress::Comet { round_over, .. }) => {
                *round_over = true;
            }
            (signal, _) => log::trace!("Tier {} level ignores timer {signal:?}", self.tier),
        }
    }

    pub(super) fn on_signal<S: SpawnCoordinator + ?Sized>(
        &mut self,
        signal: GameplaySignal,
        spawner: &mut S,
        events: &mut Vec<LevelEvent>,
    ) -> OnslaughtResult<()> {
        let mut next_phase = None;

        match (&mut self.progress, signal) {
            (Progress::Horde { destroyed }, GameplaySignal::EnemyDestroyed) => *destroyed += 1,
            (Progress::Invasion { invaders_lost, .. }, GameplaySignal::InvaderDestroyed) => {
                *invaders_lost += 1;
                if let ParameterBundle::Invasion(p) = &self.params {
                    if *invaders_lost == p.losing_threshold {
                        log::info!("Invaders lost {} ships at tier {}", invaders_lost, self.tier);
                        events.push(LevelEvent::ThresholdReached {
                            tier: self.tier,
                            losses: *invaders_lost,
                        });
                    }
                }
            }
            (Progress::Invasion { won_by, .. }, GameplaySignal::FactionInvasionWon(faction)) => {
                log::info!("{faction:?} won the invasion at tier {}", self.tier);
                *won_by = Some(faction);
            }
            (Progress::Boss { defeated }, GameplaySignal::BossDefeated) => *defeated = true,
            (Progress::MultiPhase { phase, defeated }, GameplaySignal::BossDefeated) => {
                let (phases, spawn_points): (&[String], &[SpawnPoint]) = match &self.params {
                    ParameterBundle::SyndicatesMultiPhaseBoss(p) | ParameterBundle::ThraxMultiPhaseBoss(p) => {
                        (p.phases.as_slice(), p.spawn_points.as_slice())
                    }
                    _ => (&[][..], &[][..]),
                };
                if *phase + 1 < phases.len() {
                    *phase += 1;
                    next_phase = Some((*phase, phases[*phase].clone(), spawn_points.to_vec()));
                } else {
                    *defeated = true;
                }
            }
            (Progress::Comet { destroyed, .. }, GameplaySignal::CometDestroyed) => *destroyed += 1,
            (_, signal) => log::trace!("{} level ignores {signal:?}", self.params.tag()),
        }

        if let Some((index, boss, spawn_points)) = next_phase {
            log::info!("Boss phase {} ({boss}) at tier {}", index + 1, self.tier);
            events.push(LevelEvent::BossPhaseAdvanced {
                tier: self.tier,
                phase: index + 1,
                boss: boss.clone(),
            });
            self.launch(spawner, SpawnSequenceSpec::single(UnitRole::Boss, boss, spawn_points))?;
        }
        Ok(())
    }
}
