//! Pity: the growing top-rarity bonus earned by pulling without luck.

use serde::{Deserialize, Serialize};

/// Pulls needed to raise the top-rarity rate once.
pub const PULLS_PER_STEP: u32 = 10;
/// Rate increase, in percent, per step.
pub const RATE_PER_STEP: f64 = 0.5;

/// Accumulated pity of one actor: the top-rarity rate bonus in percent,
/// plus pulls counted toward the next bonus step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PityState {
    /// Bonus added to the base top-rarity rate.
    pub pity: f64,
    /// Pulls since the last bonus step, always below [`PULLS_PER_STEP`].
    pub progress: u32,
}

impl PityState {
    /// A state with the given bonus and no progress.
    pub fn with_pity(pity: f64) -> Self {
        Self { pity, progress: 0 }
    }

    /// Clear all pity.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Count `pulls` toward the next step, converting every full step into
    /// rate bonus.
    pub fn advance(&mut self, pulls: u32) {
        self.progress += pulls;
        self.pity += RATE_PER_STEP * f64::from(self.progress / PULLS_PER_STEP);
        self.progress %= PULLS_PER_STEP;
    }

    /// Apply the outcome of a pull of `pulls` draws.
    pub fn record(&mut self, got_top_rarity: bool, pulls: u32) {
        if got_top_rarity {
            self.reset();
        } else {
            self.advance(pulls);
        }
    }
}
