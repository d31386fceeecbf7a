use super::schema::{FeatureVector, Label};

/// Capability the trainer and scoring service require from a learner.
///
/// Implementations must be pure at inference time: the same vector always yields the same
/// label and probability.
pub trait Classifier: Send + Sync {
    fn fit(&mut self, rows: &[FeatureVector], labels: &[Label]) -> Result<(), ClassifierError>;

    fn predict(&self, row: &FeatureVector) -> Result<Label, ClassifierError>;

    /// Probability of the approved class, in `[0, 1]`.
    fn predict_probability(&self, row: &FeatureVector) -> Result<f64, ClassifierError>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifierError {
    #[error("classifier has not been fitted")]
    NotFitted,
    #[error("cannot fit on an empty training set")]
    EmptyTrainingSet,
    #[error("training set has {rows} rows but {labels} labels")]
    LengthMismatch { rows: usize, labels: usize },
    #[error("input contains a non-finite value in column '{column}'")]
    NonFiniteFeature { column: &'static str },
    #[error("invalid classifier configuration: {0}")]
    InvalidConfig(String),
    #[error("model structure is corrupt: {0}")]
    MalformedModel(String),
}

/// Shared input check for implementations.
pub(crate) fn ensure_finite(row: &FeatureVector) -> Result<(), ClassifierError> {
    match row.first_non_finite() {
        Some((_, column)) => Err(ClassifierError::NonFiniteFeature { column }),
        None => Ok(()),
    }
}

pub(crate) fn ensure_trainable(
    rows: &[FeatureVector],
    labels: &[Label],
) -> Result<(), ClassifierError> {
    if rows.len() != labels.len() {
        return Err(ClassifierError::LengthMismatch {
            rows: rows.len(),
            labels: labels.len(),
        });
    }
    if rows.is_empty() {
        return Err(ClassifierError::EmptyTrainingSet);
    }
    rows.iter().try_for_each(ensure_finite)
}
