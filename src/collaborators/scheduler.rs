//! # Sequence Scheduler
//!
//! A headless [`SpawnCoordinator`] that runs spawn choreography as resumable state.
//!
//! Each sequence keeps an accumulator that is advanced by the frame delta. The first batch
//! goes out on the first tick after the sequence starts, later batches whenever the
//! accumulator covers another interval. Spawns are recorded in a log that callers drain,
//! which is how the simulator learns what to shoot at.

use super::{SpawnCoordinator, SpawnPoint};
use crate::{OnslaughtError, OnslaughtResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Identifies a running spawn sequence or timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SequenceHandle(pub u64);

impl fmt::Display for SequenceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seq#{}", self.0)
    }
}

/// What a spawned unit is for, so gameplay can report it back correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitRole {
    /// Hostile ship the player has to destroy
    Enemy,
    /// Ship of the defending faction during an invasion
    Defender,
    /// Ship of the invading faction during an invasion
    Invader,
    /// Ship launched by a spawner boss
    Minion,
    /// A boss or boss phase
    Boss,
    /// Formation ship escorting a boss
    Escort,
    /// Comet hazard
    Comet,
}

/// Payload returned when a timer elapses. Routed back to the level that armed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerSignal {
    /// Activate the level's special objective
    ActivateObjective,
    /// End the current round
    EndRound,
    /// Fallback completion for a level that lost its choreography
    DegradedTimeout,
}

/// Data-only description of a spawn sequence.
///
/// Units are taken from `units` in round-robin order. With `total` set the sequence is
/// exhausted after that many units; without it the sequence repeats until cancelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnSequenceSpec {
    pub role: UnitRole,
    pub units: Vec<String>,
    pub batch: u32,
    pub interval: Duration,
    pub total: Option<u32>,
    pub spawn_points: Vec<SpawnPoint>,
}

impl SpawnSequenceSpec {
    /// One unit every `interval` until `count` units have spawned.
    pub fn stream(role: UnitRole, units: Vec<String>, count: u32, interval: Duration) -> Self {
        Self {
            role,
            units,
            batch: 1,
            interval,
            total: Some(count),
            spawn_points: Vec::new(),
        }
    }

    /// `batch` units every `interval` until cancelled.
    pub fn repeating(role: UnitRole, units: Vec<String>, batch: u32, interval: Duration) -> Self {
        Self {
            role,
            units,
            batch,
            interval,
            total: None,
            spawn_points: Vec::new(),
        }
    }

    /// `count` units all at once.
    pub fn burst(role: UnitRole, units: Vec<String>, count: u32) -> Self {
        Self {
            role,
            units,
            batch: count.max(1),
            interval: Duration::ZERO,
            total: Some(count),
            spawn_points: Vec::new(),
        }
    }

    /// A single named unit placed at one of `spawn_points`.
    pub fn single(role: UnitRole, name: impl Into<String>, spawn_points: Vec<SpawnPoint>) -> Self {
        Self {
            spawn_points,
            ..Self::burst(role, vec![name.into()], 1)
        }
    }

    /// Checks that the sequence can run to completion without stalling.
    pub fn validate(&self) -> OnslaughtResult<()> {
        if self.units.is_empty() || self.units.iter().any(|unit| unit.is_empty()) {
            return Err(OnslaughtError::SpawnRejected(format!(
                "{:?} sequence has no usable units",
                self.role
            )));
        }
        if self.batch == 0 {
            return Err(OnslaughtError::SpawnRejected(format!(
                "{:?} sequence has an empty batch",
                self.role
            )));
        }
        if self.total.is_none() && self.interval.is_zero() {
            return Err(OnslaughtError::SpawnRejected(format!(
                "{:?} sequence repeats without an interval",
                self.role
            )));
        }
        Ok(())
    }
}

/// Something that happened while advancing the scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SequenceEvent {
    /// A unit was spawned by a sequence
    Spawned {
        handle: SequenceHandle,
        role: UnitRole,
        unit: String,
    },
    /// A finite sequence spawned its last unit
    Exhausted { handle: SequenceHandle },
    /// A timer elapsed
    TimerElapsed {
        handle: SequenceHandle,
        signal: TimerSignal,
    },
}

impl SequenceEvent {
    /// Handle of the sequence or timer this event belongs to.
    pub fn handle(&self) -> SequenceHandle {
        match self {
            SequenceEvent::Spawned { handle, .. }
            | SequenceEvent::Exhausted { handle }
            | SequenceEvent::TimerElapsed { handle, .. } => *handle,
        }
    }
}

/// Entry in the scheduler's spawn log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnRecord {
    pub handle: SequenceHandle,
    pub role: UnitRole,
    pub unit: String,
    pub spawn_point: Option<SpawnPoint>,
}

#[derive(Debug, Clone)]
struct RunningSequence {
    handle: SequenceHandle,
    spec: SpawnSequenceSpec,
    emitted: u32,
    batches: u32,
    accumulator: Duration,
}

impl RunningSequence {
    fn is_exhausted(&self) -> bool {
        self.spec.total.is_some_and(|total| self.emitted >= total)
    }

    fn emit_batch(&mut self, log: &mut Vec<SpawnRecord>, events: &mut Vec<SequenceEvent>) {
        let remaining = self
            .spec
            .total
            .map_or(self.spec.batch, |total| total.saturating_sub(self.emitted));
        let count = self.spec.batch.min(remaining);

        for _ in 0..count {
            let index = self.emitted as usize;
            let unit = self.spec.units[index % self.spec.units.len()].clone();
            let spawn_point = if self.spec.spawn_points.is_empty() {
                None
            } else {
                Some(self.spec.spawn_points[index % self.spec.spawn_points.len()])
            };

            log.push(SpawnRecord {
                handle: self.handle,
                role: self.spec.role,
                unit: unit.clone(),
                spawn_point,
            });
            events.push(SequenceEvent::Spawned {
                handle: self.handle,
                role: self.spec.role,
                unit,
            });
            self.emitted += 1;
        }
        self.batches += 1;
    }
}

#[derive(Debug, Clone)]
struct RunningTimer {
    handle: SequenceHandle,
    remaining: Duration,
    signal: TimerSignal,
}

/// In-memory spawn coordinator.
#[derive(Debug, Default)]
pub struct SequenceScheduler {
    next_handle: u64,
    sequences: Vec<RunningSequence>,
    timers: Vec<RunningTimer>,
    spawn_log: Vec<SpawnRecord>,
    cancelled: Vec<SequenceHandle>,
}

impl SequenceScheduler {
    /// Creates an idle scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sequences and timers still running.
    pub fn running_count(&self) -> usize {
        self.sequences.len() + self.timers.len()
    }

    /// Spawns recorded since the log was last drained.
    pub fn spawned(&self) -> &[SpawnRecord] {
        &self.spawn_log
    }

    /// Takes the spawn log, leaving it empty.
    pub fn drain_spawned(&mut self) -> Vec<SpawnRecord> {
        std::mem::take(&mut self.spawn_log)
    }

    /// Every handle that was cancelled while still running, in cancellation order.
    pub fn cancelled(&self) -> &[SequenceHandle] {
        &self.cancelled
    }

    fn allocate_handle(&mut self) -> SequenceHandle {
        self.next_handle += 1;
        SequenceHandle(self.next_handle)
    }
}

impl SpawnCoordinator for SequenceScheduler {
    fn start_spawn_sequence(&mut self, spec: SpawnSequenceSpec) -> OnslaughtResult<SequenceHandle> {
        spec.validate()?;
        let handle = self.allocate_handle();
        log::debug!(
            "Starting {handle}: {:?} x{:?} every {:?}",
            spec.role,
            spec.total,
            spec.interval
        );
        self.sequences.push(RunningSequence {
            handle,
            spec,
            emitted: 0,
            batches: 0,
            accumulator: Duration::ZERO,
        });
        Ok(handle)
    }

    fn cancel_spawn_sequence(&mut self, handle: SequenceHandle) -> bool {
        let before = self.running_count();
        self.sequences.retain(|sequence| sequence.handle != handle);
        self.timers.retain(|timer| timer.handle != handle);
        let removed = self.running_count() < before;
        if removed {
            log::debug!("Cancelled {handle}");
            self.cancelled.push(handle);
        }
        removed
    }

    fn start_timed_sequence(&mut self, delay: Duration, signal: TimerSignal) -> SequenceHandle {
        let handle = self.allocate_handle();
        log::debug!("Arming {handle}: {signal:?} in {delay:?}");
        self.timers.push(RunningTimer {
            handle,
            remaining: delay,
            signal,
        });
        handle
    }

    fn advance(&mut self, dt: Duration) -> Vec<SequenceEvent> {
        let mut events = Vec::new();

        for sequence in self.sequences.iter_mut() {
            sequence.accumulator = sequence.accumulator.saturating_add(dt);
            while !sequence.is_exhausted() {
                if sequence.batches > 0 {
                    if sequence.accumulator < sequence.spec.interval {
                        break;
                    }
                    sequence.accumulator -= sequence.spec.interval;
                }
                sequence.emit_batch(&mut self.spawn_log, &mut events);
            }
            if sequence.is_exhausted() {
                events.push(SequenceEvent::Exhausted {
                    handle: sequence.handle,
                });
            }
        }
        self.sequences.retain(|sequence| !sequence.is_exhausted());

        for timer in self.timers.iter_mut() {
            timer.remaining = timer.remaining.saturating_sub(dt);
            if timer.remaining.is_zero() {
                events.push(SequenceEvent::TimerElapsed {
                    handle: timer.handle,
                    signal: timer.signal,
                });
            }
        }
        self.timers.retain(|timer| !timer.remaining.is_zero());

        events
    }

    fn is_running(&self, handle: SequenceHandle) -> bool {
        self.sequences.iter().any(|sequence| sequence.handle == handle)
            || self.timers.iter().any(|timer| timer.handle == handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_stream_spawns_first_unit_immediately() {
        let mut scheduler = SequenceScheduler::new();
        let spec = SpawnSequenceSpec::stream(
            UnitRole::Enemy,
            units(&["SmallShip"]),
            3,
            Duration::from_millis(500),
        );
        let handle = scheduler.start_spawn_sequence(spec).unwrap();

        let events = scheduler.advance(Duration::from_millis(16));
        assert_eq!(events.len(), 1);
        assert_eq!(scheduler.spawned().len(), 1);
        assert!(scheduler.is_running(handle));
    }

    #[test]
    fn test_stream_respects_interval_and_exhausts() {
        let mut scheduler = SequenceScheduler::new();
        let spec = SpawnSequenceSpec::stream(
            UnitRole::Comet,
            units(&["Comet"]),
            3,
            Duration::from_millis(500),
        );
        let handle = scheduler.start_spawn_sequence(spec).unwrap();

        scheduler.advance(Duration::from_millis(100));
        scheduler.advance(Duration::from_millis(300));
        assert_eq!(scheduler.spawned().len(), 1);

        scheduler.advance(Duration::from_millis(100));
        assert_eq!(scheduler.spawned().len(), 2);

        let events = scheduler.advance(Duration::from_secs(1));
        assert_eq!(scheduler.spawned().len(), 3);
        assert!(events.contains(&SequenceEvent::Exhausted { handle }));
        assert!(!scheduler.is_running(handle));
    }

    #[test]
    fn test_burst_and_round_robin_units() {
        let mut scheduler = SequenceScheduler::new();
        let spec = SpawnSequenceSpec::burst(UnitRole::Escort, units(&["A", "B"]), 5);
        scheduler.start_spawn_sequence(spec).unwrap();

        scheduler.advance(Duration::from_millis(16));
        let names: Vec<_> = scheduler
            .drain_spawned()
            .into_iter()
            .map(|record| record.unit)
            .collect();
        assert_eq!(names, vec!["A", "B", "A", "B", "A"]);
        assert!(scheduler.spawned().is_empty());
        assert_eq!(scheduler.running_count(), 0);
    }

    #[test]
    fn test_single_uses_spawn_points() {
        let mut scheduler = SequenceScheduler::new();
        let point = SpawnPoint::new(4.0, 2.0);
        let spec = SpawnSequenceSpec::single(UnitRole::Boss, "Gunship", vec![point]);
        scheduler.start_spawn_sequence(spec).unwrap();
        scheduler.advance(Duration::ZERO);

        assert_eq!(scheduler.spawned()[0].spawn_point, Some(point));
        assert_eq!(scheduler.spawned()[0].role, UnitRole::Boss);
    }

    #[test]
    fn test_repeating_runs_until_cancelled() {
        let mut scheduler = SequenceScheduler::new();
        let spec = SpawnSequenceSpec::repeating(
            UnitRole::Minion,
            units(&["Drone"]),
            2,
            Duration::from_secs(1),
        );
        let handle = scheduler.start_spawn_sequence(spec).unwrap();

        // Batches at t = 0, 1, 2, 3, 4 and 5 seconds.
        for _ in 0..5 {
            scheduler.advance(Duration::from_secs(1));
        }
        assert_eq!(scheduler.spawned().len(), 12);

        assert!(scheduler.cancel_spawn_sequence(handle));
        assert!(!scheduler.cancel_spawn_sequence(handle));
        scheduler.advance(Duration::from_secs(5));
        assert_eq!(scheduler.spawned().len(), 12);
        assert_eq!(scheduler.cancelled(), &[handle]);
    }

    #[test]
    fn test_rejects_unusable_sequences() {
        let mut scheduler = SequenceScheduler::new();

        let no_units = SpawnSequenceSpec::stream(UnitRole::Enemy, Vec::new(), 3, Duration::ZERO);
        assert!(matches!(
            scheduler.start_spawn_sequence(no_units),
            Err(OnslaughtError::SpawnRejected(_))
        ));

        let no_interval =
            SpawnSequenceSpec::repeating(UnitRole::Minion, units(&["Drone"]), 1, Duration::ZERO);
        assert!(scheduler.start_spawn_sequence(no_interval).is_err());

        let nameless = SpawnSequenceSpec::single(UnitRole::Boss, "", Vec::new());
        assert!(scheduler.start_spawn_sequence(nameless).is_err());
        assert_eq!(scheduler.running_count(), 0);
    }

    #[test]
    fn test_timer_fires_once() {
        let mut scheduler = SequenceScheduler::new();
        let handle = scheduler.start_timed_sequence(Duration::from_secs(3), TimerSignal::EndRound);

        assert!(scheduler.advance(Duration::from_secs(2)).is_empty());
        let events = scheduler.advance(Duration::from_secs(1));
        assert_eq!(
            events,
            vec![SequenceEvent::TimerElapsed {
                handle,
                signal: TimerSignal::EndRound
            }]
        );
        assert!(scheduler.advance(Duration::from_secs(10)).is_empty());
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let mut scheduler = SequenceScheduler::new();
        let handle =
            scheduler.start_timed_sequence(Duration::from_secs(1), TimerSignal::ActivateObjective);
        assert!(scheduler.cancel_spawn_sequence(handle));
        assert!(scheduler.advance(Duration::from_secs(2)).is_empty());
    }
}
