//! Lifeboat what-if: each 20 boats are worth 38 survival points, capped at 100.

use serde::{Deserialize, Serialize};

use crate::controls::LifeboatCount;

/// Boats the historical survival share is expressed against.
pub const BASELINE_LIFEBOATS: f64 = 20.0;
/// Survival percentage credited per `BASELINE_LIFEBOATS` boats.
pub const BASELINE_SURVIVAL_PERCENT: f64 = 38.0;
/// Upper bound of the estimate.
pub const MAX_PERCENT: f64 = 100.0;

/// Result of the scenario formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioEstimate {
    /// Slider value.
    pub lifeboats: LifeboatCount,
    /// Estimated survival percentage in `[0, 100]`.
    pub percent: f64,
}

impl ScenarioEstimate {
    /// Applies `min(boats / 20 * 38, 100)`.
    #[must_use]
    pub fn estimate(lifeboats: LifeboatCount) -> Self {
        let boats = f64::from(lifeboats.boats());
        let percent = (boats / BASELINE_LIFEBOATS * BASELINE_SURVIVAL_PERCENT).min(MAX_PERCENT);
        Self { lifeboats, percent }
    }

    /// Progress bar fill: the integer part of the percentage.
    #[must_use]
    pub fn progress(&self) -> u8 {
        // percent is clamped to [0, 100]
        self.percent.trunc().clamp(0.0, MAX_PERCENT) as u8
    }

    /// Display string, e.g. `66.5%`.
    #[must_use]
    pub fn display(&self) -> String {
        format!("{:.1}%", self.percent)
    }

    /// One-line terminal summary.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "with {} lifeboats the estimated survival rate is {} (progress {}/100)",
            self.lifeboats,
            self.display(),
            self.progress()
        )
    }
}
