use serde::{Deserialize, Serialize};

/// Linear-interpolated quantile of an ascending slice (`q` in `[0, 1]`).
#[must_use]
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let q = q.clamp(0.0, 1.0);
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Box-and-whisker summary with Tukey fences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxStats {
    /// Observations.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Lowest observation inside the lower fence.
    pub lower_whisker: f64,
    /// First quartile.
    pub q1: f64,
    /// Median.
    pub median: f64,
    /// Third quartile.
    pub q3: f64,
    /// Highest observation inside the upper fence.
    pub upper_whisker: f64,
    /// Observations beyond the fences, ascending.
    pub outliers: Vec<f64>,
}

impl BoxStats {
    /// Summarises `values`; `None` when empty. Non-finite values are ignored.
    #[must_use]
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile(&sorted, 0.25)?;
        let median = quantile(&sorted, 0.5)?;
        let q3 = quantile(&sorted, 0.75)?;
        let iqr = q3 - q1;
        let low_fence = q1 - 1.5 * iqr;
        let high_fence = q3 + 1.5 * iqr;

        let inside = sorted
            .iter()
            .copied()
            .filter(|v| (low_fence..=high_fence).contains(v));
        let (lower_whisker, upper_whisker) = inside
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| !(low_fence..=high_fence).contains(v))
            .collect();

        Some(Self {
            count: sorted.len(),
            mean: sorted.iter().sum::<f64>() / sorted.len() as f64,
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
            outliers,
        })
    }

    /// Largest value drawn on the plot, outliers included.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.outliers
            .last()
            .copied()
            .map_or(self.upper_whisker, |v| v.max(self.upper_whisker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantiles_interpolate_linearly() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&sorted, 0.0), Some(1.0));
        assert_eq!(quantile(&sorted, 0.5), Some(2.5));
        assert_eq!(quantile(&sorted, 0.25), Some(1.75));
        assert_eq!(quantile(&sorted, 1.0), Some(4.0));
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn box_stats_separate_outliers() {
        let stats = BoxStats::from_values([2.0, 4.0, 4.0, 5.0, 6.0, 7.0, 80.0]).unwrap();
        assert_eq!(stats.count, 7);
        assert!((stats.median - 5.0).abs() < 1e-12);
        assert!((stats.q1 - 4.0).abs() < 1e-12);
        assert!((stats.q3 - 6.5).abs() < 1e-12);
        assert_eq!(stats.outliers, vec![80.0]);
        assert!((stats.upper_whisker - 7.0).abs() < 1e-12);
        assert!((stats.lower_whisker - 2.0).abs() < 1e-12);
        assert!((stats.max() - 80.0).abs() < 1e-12);
    }

    #[test]
    fn empty_input_has_no_box() {
        assert!(BoxStats::from_values(Vec::new()).is_none());
    }
}
