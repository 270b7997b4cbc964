//! Events published by levels and the controller, and the statistics built from them.

use crate::{LevelId, LevelTypeTag, ProgressionTier};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Presentation-facing side effects, drained by the host game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LevelEvent {
    /// A level was generated and appended to the registry
    LevelGenerated {
        id: LevelId,
        tier: ProgressionTier,
        tag: LevelTypeTag,
    },
    /// A level became Active
    LevelStarted {
        id: LevelId,
        tier: ProgressionTier,
        tag: LevelTypeTag,
    },
    /// A level objective should be shown to the player
    ObjectiveActivated { tier: ProgressionTier, name: String },
    /// Invaders lost enough ships to end the invasion
    ThresholdReached { tier: ProgressionTier, losses: u32 },
    /// A multi-phase boss entered its next phase (1-based)
    BossPhaseAdvanced {
        tier: ProgressionTier,
        phase: usize,
        boss: String,
    },
    /// A level lost its choreography and will complete on a timeout
    LevelDegraded {
        tier: ProgressionTier,
        tag: LevelTypeTag,
        reason: String,
    },
    /// A level completed and progression advanced
    LevelCompleted {
        id: LevelId,
        tier: ProgressionTier,
        tag: LevelTypeTag,
        currency: f32,
        elapsed_seconds: f32,
    },
}

/// Aggregate statistics for a progression run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressionStatistics {
    pub levels_generated: u32,
    pub levels_started: u32,
    pub levels_completed: u32,
    pub bosses_defeated: u32,
    pub boss_phases_advanced: u32,
    pub objectives_activated: u32,
    pub degraded_levels: u32,
    /// Total currency awarded by completed levels
    pub currency_awarded: f64,
    pub highest_tier_completed: u32,
    pub completed_by_type: HashMap<LevelTypeTag, u32>,
}

impl ProgressionStatistics {
    /// Creates new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates statistics based on a level event.
    pub fn update_from_event(&mut self, event: &LevelEvent) {
        match event {
            LevelEvent::LevelGenerated { .. } => self.levels_generated += 1,
            LevelEvent::LevelStarted { .. } => self.levels_started += 1,
            LevelEvent::ObjectiveActivated { .. } => self.objectives_activated += 1,
            LevelEvent::BossPhaseAdvanced { .. } => self.boss_phases_advanced += 1,
            LevelEvent::LevelDegraded { .. } => self.degraded_levels += 1,
            LevelEvent::LevelCompleted {
                tier, tag, currency, ..
            } => {
                self.levels_completed += 1;
                if tag.is_boss() {
                    self.bosses_defeated += 1;
                }
                self.currency_awarded += f64::from(*currency);
                self.highest_tier_completed = self.highest_tier_completed.max(tier.get());
                *self.completed_by_type.entry(*tag).or_insert(0) += 1;
            }
            LevelEvent::ThresholdReached { .. } => {}
        }
    }
}
