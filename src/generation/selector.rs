//! Weighted-random choice of the next level type.

use super::{Draw, GenerationRequest, Generator, LevelTypeTag, SelectionDraw};
use crate::{config, FactionTag, OnslaughtError, OnslaughtResult, ProgressionTier};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Coarse level family picked by the primary draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LevelCategory {
    Invasion,
    Boss,
    MultiPhaseBoss,
    Comet,
    Horde,
}

/// Exclusive upper bound of each primary-draw band, in ascending order.
///
/// Bands are closed-open and together cover `[0, 1)`.
pub const SELECTION_BANDS: [(f32, LevelCategory); 5] = [
    (0.2, LevelCategory::Invasion),
    (0.4, LevelCategory::Boss),
    (0.55, LevelCategory::MultiPhaseBoss),
    (0.575, LevelCategory::Comet),
    (1.0, LevelCategory::Horde),
];

/// Secondary draws below this split pick the spawner boss.
pub const SPAWNER_BOSS_SPLIT: f32 = 0.5;

/// Maps a tier and random draws to a level type.
///
/// Selection is pure given its draws; [`LevelTypeSelector::select`] is the convenience
/// wrapper that samples them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LevelTypeSelector;

impl LevelTypeSelector {
    /// Create a new selector.
    pub fn new() -> Self {
        Self
    }

    /// Band the primary draw falls into.
    pub fn category(primary: Draw) -> LevelCategory {
        let value = primary.value();
        SELECTION_BANDS
            .iter()
            .find(|(upper, _)| value < *upper)
            .map(|(_, category)| *category)
            .unwrap_or(LevelCategory::Horde)
    }

    /// Chooses the level type for `tier`.
    ///
    /// # Examples
    ///
    /// ```
    /// use onslaught::{FactionTag, LevelTypeSelector, LevelTypeTag, ProgressionTier, SelectionDraw};
    ///
    /// let tier = ProgressionTier::try_new(11).unwrap();
    /// let draw = SelectionDraw::new(0.3, 0.6).unwrap();
    /// let tag = LevelTypeSelector::new().choose(tier, draw, Some(FactionTag::Syndicates));
    /// assert_eq!(tag, LevelTypeTag::ShooterBoss);
    /// ```
    pub fn choose(
        &self,
        tier: ProgressionTier,
        draw: SelectionDraw,
        defending: Option<FactionTag>,
    ) -> LevelTypeTag {
        if tier.get() <= config::HORDE_ONLY_TIER_CEILING {
            return LevelTypeTag::Horde;
        }

        match Self::category(draw.primary) {
            LevelCategory::Invasion => LevelTypeTag::Invasion,
            LevelCategory::Boss => {
                if draw.secondary.value() < SPAWNER_BOSS_SPLIT {
                    LevelTypeTag::SpawnerBoss
                } else {
                    LevelTypeTag::ShooterBoss
                }
            }
            LevelCategory::MultiPhaseBoss => match defending {
                Some(FactionTag::ThraxArmada) => LevelTypeTag::ThraxMultiPhaseBoss,
                Some(FactionTag::Syndicates) => LevelTypeTag::SyndicatesMultiPhaseBoss,
                None => {
                    log::warn!("No defending faction for multi-phase boss; using Syndicates");
                    LevelTypeTag::SyndicatesMultiPhaseBoss
                }
            },
            LevelCategory::Comet => LevelTypeTag::Comet,
            LevelCategory::Horde => LevelTypeTag::Horde,
        }
    }

    /// Samples fresh draws and chooses.
    pub fn select<R: Rng + ?Sized>(
        &self,
        tier: ProgressionTier,
        defending: Option<FactionTag>,
        rng: &mut R,
    ) -> LevelTypeTag {
        let draw = SelectionDraw::sample(rng);
        let tag = self.choose(tier, draw, defending);
        log::debug!(
            "Tier {} draws ({:.3}, {:.3}) -> {}",
            tier,
            draw.primary.value(),
            draw.secondary.value(),
            tag
        );
        tag
    }
}

impl Generator<LevelTypeTag> for LevelTypeSelector {
    fn generate(&self, request: &GenerationRequest, rng: &mut StdRng) -> OnslaughtResult<LevelTypeTag> {
        if let Some(forced) = request.tag {
            log::debug!("Level type forced to {forced} at tier {}", request.tier);
            return Ok(forced);
        }
        Ok(self.select(request.tier, request.factions.defending, rng))
    }

    fn validate(&self, content: &LevelTypeTag, request: &GenerationRequest) -> OnslaughtResult<()> {
        let forced = request.tag.is_some();
        if !forced && request.tier.get() <= config::HORDE_ONLY_TIER_CEILING && *content != LevelTypeTag::Horde {
            return Err(OnslaughtError::Configuration(format!(
                "tier {} may only generate horde levels, got {content}",
                request.tier
            )));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "LevelTypeSelector"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FactionSnapshot, RosterSnapshot};
    use rand::SeedableRng;

    fn tier(value: i64) -> ProgressionTier {
        ProgressionTier::try_new(value).unwrap()
    }

    fn draw(primary: f32, secondary: f32) -> SelectionDraw {
        SelectionDraw::new(primary, secondary).unwrap()
    }

    #[test]
    fn test_early_tiers_are_always_horde() {
        let selector = LevelTypeSelector::new();
        for t in 1..=10 {
            for primary in [0.0, 0.1, 0.3, 0.5, 0.56, 0.9] {
                assert_eq!(
                    selector.choose(tier(t), draw(primary, 0.1), Some(FactionTag::ThraxArmada)),
                    LevelTypeTag::Horde
                );
            }
        }
    }

    #[test]
    fn test_band_boundaries_are_closed_open() {
        let cases = [
            (0.0, LevelCategory::Invasion),
            (0.199_999, LevelCategory::Invasion),
            (0.2, LevelCategory::Boss),
            (0.399_999, LevelCategory::Boss),
            (0.4, LevelCategory::MultiPhaseBoss),
            (0.549_999, LevelCategory::MultiPhaseBoss),
            (0.55, LevelCategory::Comet),
            (0.574_999, LevelCategory::Comet),
            (0.575, LevelCategory::Horde),
            (0.999_999, LevelCategory::Horde),
        ];
        for (value, expected) in cases {
            assert_eq!(
                LevelTypeSelector::category(Draw::new(value).unwrap()),
                expected,
                "draw {value}"
            );
        }
    }

    #[test]
    fn test_boss_split() {
        let selector = LevelTypeSelector::new();
        assert_eq!(
            selector.choose(tier(11), draw(0.3, 0.49), None),
            LevelTypeTag::SpawnerBoss
        );
        assert_eq!(
            selector.choose(tier(11), draw(0.3, 0.5), None),
            LevelTypeTag::ShooterBoss
        );
    }

    #[test]
    fn test_multi_phase_follows_defender() {
        let selector = LevelTypeSelector::new();
        let d = draw(0.45, 0.0);
        assert_eq!(
            selector.choose(tier(20), d, Some(FactionTag::ThraxArmada)),
            LevelTypeTag::ThraxMultiPhaseBoss
        );
        assert_eq!(
            selector.choose(tier(20), d, Some(FactionTag::Syndicates)),
            LevelTypeTag::SyndicatesMultiPhaseBoss
        );
        assert_eq!(
            selector.choose(tier(20), d, None),
            LevelTypeTag::SyndicatesMultiPhaseBoss
        );
    }

    #[test]
    fn test_tier_eleven_invasion() {
        let selector = LevelTypeSelector::new();
        assert_eq!(
            selector.choose(tier(11), draw(0.1, 0.9), None),
            LevelTypeTag::Invasion
        );
    }

    #[test]
    fn test_generator_honours_forced_tag() {
        let selector = LevelTypeSelector::new();
        let mut rng = StdRng::seed_from_u64(1);
        let request = GenerationRequest::new(tier(2), FactionSnapshot::default(), RosterSnapshot::default())
            .with_tag(LevelTypeTag::Comet);

        let tag = selector.generate(&request, &mut rng).unwrap();
        assert_eq!(tag, LevelTypeTag::Comet);
        assert!(selector.validate(&tag, &request).is_ok());
    }

    #[test]
    fn test_validate_rejects_early_non_horde() {
        let selector = LevelTypeSelector::new();
        let request = GenerationRequest::new(tier(4), FactionSnapshot::default(), RosterSnapshot::default());
        assert!(selector.validate(&LevelTypeTag::Invasion, &request).is_err());
        assert!(selector.validate(&LevelTypeTag::Horde, &request).is_ok());
    }
}
