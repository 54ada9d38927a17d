//! Chart aggregations. Every function here is pure over the passenger table.

/// Age-group crosstab for the heatmap view.
pub mod heatmap;
/// Static voyage map.
pub mod route;
/// Descriptive statistics shared by the charts.
pub mod stats;
/// Outcome breakdowns for the survival analysis view.
pub mod survival;

use serde::{Deserialize, Serialize};

/// Passenger counts per category split by outcome, drawn as stacked bars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    /// Chart title.
    pub title: String,
    /// Axis label for the categories.
    pub axis: String,
    /// Category labels in axis order.
    pub categories: Vec<String>,
    /// Non-survivors per category.
    pub died: Vec<usize>,
    /// Survivors per category.
    pub survived: Vec<usize>,
}

impl OutcomeCounts {
    /// Total passengers in category `idx`.
    #[must_use]
    pub fn total(&self, idx: usize) -> usize {
        self.died.get(idx).copied().unwrap_or(0) + self.survived.get(idx).copied().unwrap_or(0)
    }

    /// Largest stacked bar height.
    #[must_use]
    pub fn max_total(&self) -> usize {
        (0..self.categories.len())
            .map(|idx| self.total(idx))
            .max()
            .unwrap_or(0)
    }
}
