use ndarray::{ArrayView1, ArrayView2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::{
    tree::{DecisionTree, TreeParams},
    ModelError,
};

/// How many features each split considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    /// `floor(sqrt(n_features))`, at least one.
    #[default]
    Sqrt,
    /// Every feature.
    All,
    /// A fixed count, clamped to `1..=n_features`.
    Fixed(usize),
}

impl MaxFeatures {
    /// Resolves the count for a matrix with `n_features` columns.
    #[must_use]
    pub fn resolve(self, n_features: usize) -> usize {
        let count = match self {
            Self::Sqrt => (n_features as f64).sqrt().floor() as usize,
            Self::All => n_features,
            Self::Fixed(count) => count,
        };
        count.clamp(1, n_features.max(1))
    }
}

/// Random forest hyper-parameters. Defaults mirror the usual library
/// defaults for classification, plus a fixed seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestParams {
    /// Number of trees.
    pub trees: usize,
    /// Maximum tree depth, unlimited when `None`.
    pub max_depth: Option<usize>,
    /// Minimum samples required to split a node.
    pub min_samples_split: usize,
    /// Minimum samples per leaf.
    pub min_samples_leaf: usize,
    /// Features considered per split.
    pub max_features: MaxFeatures,
    /// Sample rows with replacement for each tree.
    pub bootstrap: bool,
    /// Seed for bootstrap and feature sampling.
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl ForestParams {
    /// Checks every parameter's domain.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.trees == 0 {
            return Err(ModelError::InvalidParams("trees must be at least 1".into()));
        }
        if self.min_samples_split < 2 {
            return Err(ModelError::InvalidParams(
                "min_samples_split must be at least 2".into(),
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(ModelError::InvalidParams(
                "min_samples_leaf must be at least 1".into(),
            ));
        }
        if self.max_depth == Some(0) {
            return Err(ModelError::InvalidParams(
                "max_depth must be at least 1 when set".into(),
            ));
        }
        if self.max_features == MaxFeatures::Fixed(0) {
            return Err(ModelError::InvalidParams(
                "max_features must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Bagged ensemble of CART trees; the positive-class probability is the mean
/// of the per-tree leaf probabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_features: usize,
    params: ForestParams,
}

impl RandomForest {
    /// Fits the forest. Identical inputs and seed give an identical forest.
    pub fn fit(
        features: ArrayView2<'_, f64>,
        labels: &[bool],
        params: ForestParams,
    ) -> Result<Self, ModelError> {
        params.validate()?;
        let (rows, n_features) = features.dim();
        if rows == 0 {
            return Err(ModelError::EmptyTrainingSet);
        }
        if n_features == 0 {
            return Err(ModelError::NoFeatures);
        }
        if rows != labels.len() {
            return Err(ModelError::LabelMismatch {
                rows,
                labels: labels.len(),
            });
        }
        let positives = labels.iter().filter(|label| **label).count();
        if positives == 0 || positives == rows {
            return Err(ModelError::SingleClass {
                survived: positives == rows,
            });
        }

        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split,
            min_samples_leaf: params.min_samples_leaf,
            max_features: params.max_features.resolve(n_features),
        };
        let mut seeder = ChaCha8Rng::seed_from_u64(params.seed);
        let trees = (0..params.trees)
            .map(|_| {
                let mut rng = ChaCha8Rng::seed_from_u64(seeder.gen());
                let samples: Vec<usize> = if params.bootstrap {
                    (0..rows).map(|_| rng.gen_range(0..rows)).collect()
                } else {
                    (0..rows).collect()
                };
                DecisionTree::fit(features, labels, samples, &tree_params, &mut rng)
            })
            .collect();

        Ok(Self {
            trees,
            n_features,
            params,
        })
    }

    /// Positive-class probability for one feature row.
    pub fn predict_proba(&self, row: &[f64]) -> Result<f64, ModelError> {
        if row.len() != self.n_features {
            return Err(ModelError::FeatureWidth {
                expected: self.n_features,
                actual: row.len(),
            });
        }
        Ok(self.mean_vote(ArrayView1::from(row)))
    }

    /// Positive-class probability for every row of `features`.
    pub fn predict_proba_batch(
        &self,
        features: ArrayView2<'_, f64>,
    ) -> Result<Vec<f64>, ModelError> {
        if features.ncols() != self.n_features {
            return Err(ModelError::FeatureWidth {
                expected: self.n_features,
                actual: features.ncols(),
            });
        }
        Ok(features
            .rows()
            .into_iter()
            .map(|row| self.mean_vote(row))
            .collect())
    }

    fn mean_vote(&self, row: ArrayView1<'_, f64>) -> f64 {
        let total: f64 = self.trees.iter().map(|tree| tree.predict_proba(row)).sum();
        (total / self.trees.len() as f64).clamp(0.0, 1.0)
    }

    /// Mean of the per-tree normalized impurity decreases.
    #[must_use]
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.n_features];
        for tree in &self.trees {
            for (sum, value) in sums.iter_mut().zip(tree.feature_importances()) {
                *sum += value;
            }
        }
        let total: f64 = sums.iter().sum();
        if total > 0.0 {
            for sum in &mut sums {
                *sum /= total;
            }
        }
        sums
    }

    /// Fitted trees.
    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Parameters used for fitting.
    #[must_use]
    pub const fn params(&self) -> &ForestParams {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn toy_data() -> (Array2<f64>, Vec<bool>) {
        // Every (age, class, sex) combination; survives when young or female.
        let mut flat = Vec::new();
        let mut labels = Vec::new();
        for age in 1..=30u32 {
            for class in 1..=3u32 {
                for sex in 0..=1u32 {
                    flat.extend([f64::from(age), f64::from(class), f64::from(sex)]);
                    labels.push(age < 10 || sex == 0);
                }
            }
        }
        (Array2::from_shape_vec((labels.len(), 3), flat).unwrap(), labels)
    }

    #[test]
    fn same_seed_same_forest() {
        let (features, labels) = toy_data();
        let params = ForestParams {
            trees: 20,
            ..ForestParams::default()
        };
        let a = RandomForest::fit(features.view(), &labels, params).unwrap();
        let b = RandomForest::fit(features.view(), &labels, params).unwrap();
        assert_eq!(a, b);
        let row = [25.0, 3.0, 1.0];
        assert_eq!(a.predict_proba(&row).unwrap(), b.predict_proba(&row).unwrap());
    }

    #[test]
    fn learns_the_toy_rule() {
        let (features, labels) = toy_data();
        let forest = RandomForest::fit(features.view(), &labels, ForestParams::default()).unwrap();
        assert_eq!(forest.trees().len(), 100);
        assert!(forest.predict_proba(&[5.0, 2.0, 1.0]).unwrap() > 0.5);
        assert!(forest.predict_proba(&[25.0, 2.0, 0.0]).unwrap() > 0.5);
        assert!(forest.predict_proba(&[25.0, 2.0, 1.0]).unwrap() < 0.5);

        let batch = forest.predict_proba_batch(features.view()).unwrap();
        let correct = batch
            .iter()
            .zip(&labels)
            .filter(|(p, label)| (**p > 0.5) == **label)
            .count();
        assert!(correct >= 170);

        let importances = forest.feature_importances();
        assert!((importances.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(importances[1] < importances[0]);
    }

    #[test]
    fn rejects_degenerate_training_sets() {
        let features = Array2::<f64>::zeros((3, 3));
        assert_eq!(
            RandomForest::fit(features.view(), &[true, true, true], ForestParams::default()),
            Err(ModelError::SingleClass { survived: true })
        );
        assert_eq!(
            RandomForest::fit(features.view(), &[true, false], ForestParams::default()),
            Err(ModelError::LabelMismatch { rows: 3, labels: 2 })
        );
        let empty = Array2::<f64>::zeros((0, 3));
        assert_eq!(
            RandomForest::fit(empty.view(), &[], ForestParams::default()),
            Err(ModelError::EmptyTrainingSet)
        );
        let bad = ForestParams {
            trees: 0,
            ..ForestParams::default()
        };
        assert!(matches!(
            RandomForest::fit(features.view(), &[true, false, true], bad),
            Err(ModelError::InvalidParams(_))
        ));
    }

    #[test]
    fn rejects_wrong_row_width() {
        let (features, labels) = toy_data();
        let params = ForestParams {
            trees: 5,
            ..ForestParams::default()
        };
        let forest = RandomForest::fit(features.view(), &labels, params).unwrap();
        assert_eq!(
            forest.predict_proba(&[1.0, 2.0]),
            Err(ModelError::FeatureWidth {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn sqrt_of_three_features_is_one() {
        assert_eq!(MaxFeatures::Sqrt.resolve(3), 1);
        assert_eq!(MaxFeatures::Sqrt.resolve(16), 4);
        assert_eq!(MaxFeatures::Fixed(9).resolve(3), 3);
        assert_eq!(MaxFeatures::All.resolve(3), 3);
    }
}
