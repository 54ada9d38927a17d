use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dataset::record::PassengerTable;

/// Bucket edges in years. Buckets are `(lo, hi]`.
pub const AGE_BUCKET_EDGES: [f64; 6] = [0.0, 12.0, 18.0, 40.0, 60.0, 100.0];

/// Age group used only by the heatmap view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeBucket {
    /// (0, 12]
    Child,
    /// (12, 18]
    Teen,
    /// (18, 40]
    Adult,
    /// (40, 60]
    MiddleAged,
    /// (60, 100]
    Elder,
}

impl AgeBucket {
    /// Buckets in age order.
    pub const ALL: [Self; 5] = [
        Self::Child,
        Self::Teen,
        Self::Adult,
        Self::MiddleAged,
        Self::Elder,
    ];

    /// Axis label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Child => "Child",
            Self::Teen => "Teen",
            Self::Adult => "Adult",
            Self::MiddleAged => "Middle-aged",
            Self::Elder => "Elder",
        }
    }

    /// Bucket containing `age`. An age on an edge belongs to the lower bucket;
    /// ages outside `(0, 100]` have none.
    #[must_use]
    pub fn from_age(age: f64) -> Option<Self> {
        Self::ALL.iter().enumerate().find_map(|(idx, bucket)| {
            let (lo, hi) = (AGE_BUCKET_EDGES[idx], AGE_BUCKET_EDGES[idx + 1]);
            (age > lo && age <= hi).then_some(*bucket)
        })
    }
}

impl fmt::Display for AgeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One crosstab row: outcome percentages inside a bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapRow {
    /// Age group.
    pub bucket: AgeBucket,
    /// Passengers in the group.
    pub passengers: usize,
    /// Share that died, in percent.
    pub died_pct: f64,
    /// Share that survived, in percent.
    pub survived_pct: f64,
}

impl HeatmapRow {
    /// Row total, 100 up to rounding.
    #[must_use]
    pub fn total_pct(&self) -> f64 {
        self.died_pct + self.survived_pct
    }
}

/// Row-normalized crosstab of age group against outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeHeatmap {
    /// Chart title.
    pub title: String,
    /// Non-empty buckets in age order.
    pub rows: Vec<HeatmapRow>,
    /// Passengers whose age fell outside every bucket.
    pub unbucketed: usize,
}

impl AgeHeatmap {
    /// Text rendering of the crosstab.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut lines = vec![format!("{:<12} {:>8} {:>10}", "Age group", "died %", "survived %")];
        for row in &self.rows {
            lines.push(format!(
                "{:<12} {:>8.1} {:>10.1}",
                row.bucket.label(),
                row.died_pct,
                row.survived_pct
            ));
        }
        if self.unbucketed > 0 {
            lines.push(format!("({} passengers outside 0-100 years)", self.unbucketed));
        }
        lines.join("\n")
    }
}

/// Buckets every passenger by age and normalizes outcome counts per bucket.
/// The bucket column only lives for the duration of this call.
#[must_use]
pub fn age_group_heatmap(table: &PassengerTable) -> AgeHeatmap {
    let mut died = [0usize; AgeBucket::ALL.len()];
    let mut survived = [0usize; AgeBucket::ALL.len()];
    let mut unbucketed = 0;

    for record in table {
        let Some(bucket) = AgeBucket::from_age(record.age) else {
            unbucketed += 1;
            continue;
        };
        let idx = bucket as usize;
        if record.survived {
            survived[idx] += 1;
        } else {
            died[idx] += 1;
        }
    }

    let rows = AgeBucket::ALL
        .iter()
        .enumerate()
        .filter_map(|(idx, &bucket)| {
            let passengers = died[idx] + survived[idx];
            if passengers == 0 {
                return None;
            }
            let total = passengers as f64;
            Some(HeatmapRow {
                bucket,
                passengers,
                died_pct: died[idx] as f64 / total * 100.0,
                survived_pct: survived[idx] as f64 / total * 100.0,
            })
        })
        .collect();

    AgeHeatmap {
        title: "Survival rate per age group".into(),
        rows,
        unbucketed,
    }
}
