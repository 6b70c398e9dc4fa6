//! Data-driven game balance
//!
//! Wraps a validated `GameConfig` together with the weighted distributions
//! derived from it, so nothing has to be rebuilt or re-checked per frame.

use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;

use crate::config::GameConfig;
use crate::error::ConfigError;
use crate::sim::effects::PowerUpKind;
use crate::sim::movement::PlayBounds;
use crate::sim::state::Rarity;

/// Tolerance before rarity weight drift is reported
const WEIGHT_DRIFT_TOLERANCE: f32 = 1e-3;

#[derive(Debug, Clone)]
pub struct Tuning {
    pub config: GameConfig,
    powerup_dist: WeightedIndex<f32>,
    rarity_dist: WeightedIndex<f32>,
    /// Normalized to sum to 1.0, in `Rarity::ALL` order
    rarity_weights: [f32; 3],
}

impl Tuning {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let powerup_dist =
            WeightedIndex::new(PowerUpKind::ALL.iter().map(|&k| config.powerups.weight(k)))
                .map_err(|e| ConfigError::invalid("powerups", e.to_string()))?;

        let raw = Rarity::ALL.map(|r| config.rarity.tier(r).weight);
        let total: f32 = raw.iter().sum();
        if (total - 1.0).abs() > WEIGHT_DRIFT_TOLERANCE {
            log::warn!(
                "Rarity weights sum to {} instead of 1.0; normalizing",
                total
            );
        }
        let rarity_weights = raw.map(|w| w / total);
        let rarity_dist = WeightedIndex::new(rarity_weights)
            .map_err(|e| ConfigError::invalid("rarity", e.to_string()))?;

        Ok(Self {
            config,
            powerup_dist,
            rarity_dist,
            rarity_weights,
        })
    }

    /// Weighted draw over the configured power-up kinds
    pub fn roll_power_up<R: Rng + ?Sized>(&self, rng: &mut R) -> PowerUpKind {
        PowerUpKind::ALL[self.powerup_dist.sample(rng)]
    }

    /// Weighted draw over the rarity tiers
    pub fn roll_rarity<R: Rng + ?Sized>(&self, rng: &mut R) -> Rarity {
        Rarity::ALL[self.rarity_dist.sample(rng)]
    }

    pub fn rarity_weights(&self) -> [f32; 3] {
        self.rarity_weights
    }

    pub fn bounds(&self) -> PlayBounds {
        PlayBounds {
            width: self.config.window.width,
            height: self.config.window.height,
            margin: self.config.bounds.margin,
        }
    }
}
