use serde::{Deserialize, Serialize};

use super::{stats::BoxStats, OutcomeCounts};
use crate::dataset::record::{PassengerClass, PassengerTable, Sex};

/// Everything drawn on the survival analysis view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurvivalBreakdown {
    /// Outcome per travel class.
    pub by_class: OutcomeCounts,
    /// Outcome per sex.
    pub by_sex: OutcomeCounts,
    /// Age distribution per outcome.
    pub age: AgeByOutcome,
}

/// Age box plots, one per outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeByOutcome {
    /// Non-survivors, absent when nobody died.
    pub died: Option<BoxStats>,
    /// Survivors, absent when nobody survived.
    pub survived: Option<BoxStats>,
}

impl SurvivalBreakdown {
    /// One-line-per-chart text summary.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        for counts in [&self.by_class, &self.by_sex] {
            let cells = counts
                .categories
                .iter()
                .enumerate()
                .map(|(idx, label)| {
                    format!(
                        "{label}: {} survived / {} died",
                        counts.survived[idx], counts.died[idx]
                    )
                })
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(format!("{} -> {cells}", counts.title));
        }
        for (label, stats) in [("died", &self.age.died), ("survived", &self.age.survived)] {
            if let Some(stats) = stats {
                lines.push(format!(
                    "Age ({label}): n={} median={:.1} IQR={:.1}-{:.1} mean={:.1}",
                    stats.count, stats.median, stats.q1, stats.q3, stats.mean
                ));
            }
        }
        lines.join("\n")
    }
}

/// Survival counts per class, per sex and the age distribution per outcome.
#[must_use]
pub fn survival_breakdown(table: &PassengerTable) -> SurvivalBreakdown {
    SurvivalBreakdown {
        by_class: counts_by_class(table),
        by_sex: counts_by_sex(table),
        age: AgeByOutcome {
            died: BoxStats::from_values(table.iter().filter(|r| !r.survived).map(|r| r.age)),
            survived: BoxStats::from_values(table.iter().filter(|r| r.survived).map(|r| r.age)),
        },
    }
}

/// Stacked counts per travel class.
#[must_use]
pub fn counts_by_class(table: &PassengerTable) -> OutcomeCounts {
    let mut died = vec![0; PassengerClass::ALL.len()];
    let mut survived = vec![0; PassengerClass::ALL.len()];
    for record in table {
        let idx = usize::from(record.class.number() - 1);
        if record.survived {
            survived[idx] += 1;
        } else {
            died[idx] += 1;
        }
    }
    OutcomeCounts {
        title: "Survival by travel class".into(),
        axis: "Pclass".into(),
        categories: PassengerClass::ALL.iter().map(ToString::to_string).collect(),
        died,
        survived,
    }
}

/// Stacked counts per sex.
#[must_use]
pub fn counts_by_sex(table: &PassengerTable) -> OutcomeCounts {
    let mut died = vec![0; Sex::ALL.len()];
    let mut survived = vec![0; Sex::ALL.len()];
    for record in table {
        let idx = Sex::ALL
            .iter()
            .position(|sex| *sex == record.sex)
            .unwrap_or_default();
        if record.survived {
            survived[idx] += 1;
        } else {
            died[idx] += 1;
        }
    }
    OutcomeCounts {
        title: "Survival by sex".into(),
        axis: "Sex".into(),
        categories: Sex::ALL.iter().map(ToString::to_string).collect(),
        died,
        survived,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::record::PassengerRecord;

    fn table() -> PassengerTable {
        let rows = [
            (true, PassengerClass::First, Sex::Female, 38.0),
            (true, PassengerClass::First, Sex::Male, 54.0),
            (false, PassengerClass::Second, Sex::Male, 35.0),
            (false, PassengerClass::Third, Sex::Male, 22.0),
            (false, PassengerClass::Third, Sex::Male, 2.0),
            (true, PassengerClass::Third, Sex::Female, 26.0),
        ];
        PassengerTable::new(
            rows.iter()
                .map(|&(survived, class, sex, age)| PassengerRecord {
                    survived,
                    class,
                    sex,
                    age,
                })
                .collect(),
            "fixture.csv",
            6,
        )
    }

    #[test]
    fn counts_split_by_outcome() {
        let breakdown = survival_breakdown(&table());
        assert_eq!(breakdown.by_class.categories, vec!["1", "2", "3"]);
        assert_eq!(breakdown.by_class.survived, vec![2, 0, 1]);
        assert_eq!(breakdown.by_class.died, vec![0, 1, 2]);
        assert_eq!(breakdown.by_sex.categories, vec!["male", "female"]);
        assert_eq!(breakdown.by_sex.survived, vec![1, 2]);
        assert_eq!(breakdown.by_sex.died, vec![3, 0]);
        assert_eq!(breakdown.by_class.max_total(), 3);
    }

    #[test]
    fn age_boxes_per_outcome() {
        let breakdown = survival_breakdown(&table());
        let died = breakdown.age.died.unwrap();
        assert_eq!(died.count, 3);
        assert!((died.median - 22.0).abs() < 1e-12);
        let survived = breakdown.age.survived.unwrap();
        assert_eq!(survived.count, 3);
        assert!((survived.median - 38.0).abs() < 1e-12);
    }

    #[test]
    fn summary_mentions_every_chart() {
        let summary = survival_breakdown(&table()).summary();
        assert!(summary.contains("Survival by travel class"));
        assert!(summary.contains("female: 2 survived / 0 died"));
        assert!(summary.contains("Age (died)"));
    }
}
