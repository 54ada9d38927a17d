use indexmap::IndexMap;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::{
    encoder::{SexEncoder, FEATURE_NAMES},
    forest::{ForestParams, RandomForest},
    tree::DecisionTree,
    ModelError,
};
use crate::{controls::PredictionInput, dataset::record::PassengerTable};

/// Training summary shown next to the prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelReport {
    /// Model family.
    pub model: String,
    /// Trees in the ensemble.
    pub trees: usize,
    /// Training rows.
    pub samples: usize,
    /// Seed used for fitting.
    pub seed: u64,
    /// In-sample accuracy in `[0, 1]`.
    pub training_accuracy: f64,
    /// Mean root-to-leaf depth over the trees.
    pub mean_depth: f64,
    /// Mean leaf count over the trees.
    pub mean_leaves: f64,
    /// Normalized impurity-based importance per feature.
    pub feature_importances: IndexMap<String, f64>,
}

impl ModelReport {
    /// Renders a concise summary string.
    #[must_use]
    pub fn summary(&self) -> String {
        let importances = self
            .feature_importances
            .iter()
            .map(|(name, value)| format!("{name}={value:.3}"))
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "[ML] model={} trees={} samples={} seed={} train_acc={:.3} \
             depth={:.1} leaves={:.1} importances: {importances}",
            self.model,
            self.trees,
            self.samples,
            self.seed,
            self.training_accuracy,
            self.mean_depth,
            self.mean_leaves
        )
    }
}

/// Estimated survival likelihood for one input row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurvivalEstimate {
    /// Widget values the estimate was made for.
    pub input: PredictionInput,
    /// Positive-class probability in `[0, 1]`.
    pub probability: f64,
}

impl SurvivalEstimate {
    /// Probability as a percentage in `[0, 100]`.
    #[must_use]
    pub fn percent(&self) -> f64 {
        (self.probability * 100.0).clamp(0.0, 100.0)
    }

    /// Percentage rounded to one decimal place.
    #[must_use]
    pub fn rounded_percent(&self) -> f64 {
        (self.percent() * 10.0).round() / 10.0
    }

    /// Display string, e.g. `63.4%`.
    #[must_use]
    pub fn display(&self) -> String {
        format!("{:.1}%", self.percent())
    }
}

/// Encoder and forest trained once per session and reused for every
/// prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurvivalModel {
    encoder: SexEncoder,
    forest: RandomForest,
    report: ModelReport,
}

impl SurvivalModel {
    /// Fits on every passenger in `table` using {age, class, sex}.
    pub fn train(table: &PassengerTable, params: ForestParams) -> Result<Self, ModelError> {
        if table.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        let encoder = SexEncoder;
        let flat: Vec<f64> = table
            .iter()
            .flat_map(|record| encoder.features(record))
            .collect();
        let features = Array2::from_shape_vec((table.len(), FEATURE_NAMES.len()), flat)
            .map_err(|err| ModelError::Shape(err.to_string()))?;
        let labels: Vec<bool> = table.iter().map(|record| record.survived).collect();

        let forest = RandomForest::fit(features.view(), &labels, params)?;

        let probabilities = forest.predict_proba_batch(features.view())?;
        let correct = probabilities
            .iter()
            .zip(&labels)
            .filter(|(probability, label)| (**probability > 0.5) == **label)
            .count();
        let feature_importances = FEATURE_NAMES
            .iter()
            .map(|name| (*name).to_string())
            .zip(forest.feature_importances())
            .collect();

        let trees = forest.trees();
        let tree_count = trees.len().max(1) as f64;
        let report = ModelReport {
            model: "random_forest".into(),
            trees: trees.len(),
            samples: labels.len(),
            seed: forest.params().seed,
            training_accuracy: correct as f64 / labels.len() as f64,
            mean_depth: trees.iter().map(DecisionTree::depth).sum::<usize>() as f64 / tree_count,
            mean_leaves: trees.iter().map(DecisionTree::leaf_count).sum::<usize>() as f64
                / tree_count,
            feature_importances,
        };
        Ok(Self {
            encoder,
            forest,
            report,
        })
    }

    /// Survival probability for one passenger description.
    pub fn predict(&self, input: PredictionInput) -> Result<SurvivalEstimate, ModelError> {
        let row = self
            .encoder
            .row(f64::from(input.age.years()), input.class.number(), input.sex);
        let probability = self.forest.predict_proba(&row)?;
        Ok(SurvivalEstimate { input, probability })
    }

    /// Training summary.
    #[must_use]
    pub const fn report(&self) -> &ModelReport {
        &self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        controls::AgeInput,
        dataset::record::{PassengerClass, PassengerRecord, Sex},
    };

    fn table() -> PassengerTable {
        let mut records = Vec::new();
        for idx in 0..120u32 {
            let sex = if idx % 2 == 0 { Sex::Female } else { Sex::Male };
            let class = PassengerClass::ALL[(idx % 3) as usize];
            let age = f64::from(idx % 70 + 1);
            let survived = sex == Sex::Female && class != PassengerClass::Third
                || age < 8.0
                || (class == PassengerClass::First && idx % 5 == 0);
            records.push(PassengerRecord {
                survived,
                class,
                sex,
                age,
            });
        }
        PassengerTable::new(records, "fixture.csv", 120)
    }

    fn small_params() -> ForestParams {
        ForestParams {
            trees: 25,
            ..ForestParams::default()
        }
    }

    #[test]
    fn every_valid_input_yields_a_percentage() {
        let model = SurvivalModel::train(&table(), small_params()).unwrap();
        for age in (1..=80).step_by(7).chain([80]) {
            for sex in Sex::ALL {
                for class in PassengerClass::ALL {
                    let estimate = model
                        .predict(PredictionInput {
                            age: AgeInput::new(age).unwrap(),
                            sex,
                            class,
                        })
                        .unwrap();
                    assert!((0.0..=100.0).contains(&estimate.percent()));
                    assert!((0.0..=1.0).contains(&estimate.probability));
                }
            }
        }
    }

    #[test]
    fn training_is_reproducible() {
        let a = SurvivalModel::train(&table(), small_params()).unwrap();
        let b = SurvivalModel::train(&table(), small_params()).unwrap();
        let input = PredictionInput::default();
        assert_eq!(a.predict(input).unwrap(), b.predict(input).unwrap());
        assert_eq!(a.report(), b.report());
    }

    #[test]
    fn report_describes_the_fit() {
        let model = SurvivalModel::train(&table(), small_params()).unwrap();
        let report = model.report();
        assert_eq!(report.trees, 25);
        assert_eq!(report.samples, 120);
        assert!(report.training_accuracy > 0.8);
        assert!(report.mean_depth >= 1.0);
        assert!(report.mean_leaves >= 2.0);
        assert!(report.summary().contains(&format!("depth={:.1}", report.mean_depth)));
        let keys: Vec<_> = report.feature_importances.keys().cloned().collect();
        assert_eq!(keys, vec!["age", "class", "sex"]);
        assert!(report.summary().starts_with("[ML] model=random_forest trees=25"));
    }

    #[test]
    fn single_outcome_dataset_is_a_clear_error() {
        let records = vec![
            PassengerRecord {
                survived: false,
                class: PassengerClass::Third,
                sex: Sex::Male,
                age: 30.0,
            };
            4
        ];
        let table = PassengerTable::new(records, "dead.csv", 4);
        let err = SurvivalModel::train(&table, small_params()).unwrap_err();
        assert_eq!(err, ModelError::SingleClass { survived: false });
        assert!(err.to_string().contains("both outcomes are required"));
    }

    #[test]
    fn display_rounds_to_one_decimal() {
        let estimate = SurvivalEstimate {
            input: PredictionInput::default(),
            probability: 0.63449,
        };
        assert_eq!(estimate.display(), "63.4%");
        assert!((estimate.rounded_percent() - 63.4).abs() < 1e-9);
    }
}
