//! Survival classifier: a seeded random forest over {age, class, sex}.

/// Fixed categorical encoding shared by training and inference.
pub mod encoder;
/// Bagged ensemble of decision trees.
pub mod forest;
/// Session-level survival model and its report.
pub mod predictor;
/// CART decision tree with Gini impurity.
pub mod tree;

use thiserror::Error;

/// Errors raised while fitting the survival model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// No samples to fit on.
    #[error("cannot train on an empty dataset")]
    EmptyTrainingSet,
    /// Feature rows and labels disagree.
    #[error("feature matrix has {rows} rows but {labels} labels were given")]
    LabelMismatch {
        /// Feature rows.
        rows: usize,
        /// Labels.
        labels: usize,
    },
    /// Every label has the same value, so no positive-class probability can
    /// be learned.
    #[error(
        "training data only contains survived={survived} passengers; \
         both outcomes are required"
    )]
    SingleClass {
        /// The only label present.
        survived: bool,
    },
    /// The feature matrix has no columns.
    #[error("feature matrix has no columns")]
    NoFeatures,
    /// Inference row width differs from the training width.
    #[error("expected {expected} features, got {actual}")]
    FeatureWidth {
        /// Training width.
        expected: usize,
        /// Given width.
        actual: usize,
    },
    /// The feature matrix could not be assembled.
    #[error("feature matrix shape: {0}")]
    Shape(String),
    /// Hyper-parameter outside its domain.
    #[error("invalid forest parameter: {0}")]
    InvalidParams(String),
}
