use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::artifact::ModelArtifact;
use super::classifier::{Classifier, ClassifierError};
use super::encoder::{encode, ApplicantRecord, EncodingError};
use super::forest::RandomForest;

pub const APPROVED_REASON: &str = "Model prediction based on historical data";
pub const REJECTED_REASON: &str = "High risk detected by ML model";

/// Scoring response. `risk_score` carries the approved-class probability, so higher means
/// safer despite the name; downstream consumers rely on that polarity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub is_approved: bool,
    pub risk_score: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("Model not loaded")]
    ModelUnavailable,
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Inference(#[from] ClassifierError),
}

impl ScoringError {
    /// Request field responsible for the failure, when one can be named.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ScoringError::Encoding(EncodingError::InvalidField { field, .. }) => Some(*field),
            _ => None,
        }
    }
}

enum ModelState<C> {
    Ready(C),
    Unready { reason: String },
}

/// Read-only scoring facade. The model state is fixed at construction; an unready service
/// stays unready for its whole lifetime.
pub struct ScoringService<C> {
    state: ModelState<C>,
}

impl<C: Classifier> ScoringService<C> {
    pub fn ready(classifier: C) -> Self {
        Self {
            state: ModelState::Ready(classifier),
        }
    }

    pub fn unready(reason: impl Into<String>) -> Self {
        Self {
            state: ModelState::Unready {
                reason: reason.into(),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, ModelState::Ready(_))
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.state {
            ModelState::Ready(_) => None,
            ModelState::Unready { reason } => Some(reason.as_str()),
        }
    }

    fn classifier(&self) -> Result<&C, ScoringError> {
        match &self.state {
            ModelState::Ready(classifier) => Ok(classifier),
            ModelState::Unready { .. } => Err(ScoringError::ModelUnavailable),
        }
    }

    pub fn score(&self, record: &ApplicantRecord) -> Result<Decision, ScoringError> {
        let classifier = self.classifier()?;
        let vector = encode(record);

        let label = classifier.predict(&vector)?;
        let probability = classifier.predict_probability(&vector)?;

        let is_approved = label.is_approved();
        Ok(Decision {
            is_approved,
            risk_score: probability,
            reason: if is_approved {
                APPROVED_REASON
            } else {
                REJECTED_REASON
            }
            .to_string(),
        })
    }

    /// Readiness is checked before the body is even parsed.
    pub fn score_body(&self, body: &[u8]) -> Result<Decision, ScoringError> {
        self.classifier()?;
        let record = ApplicantRecord::from_slice(body)?;
        self.score(&record)
    }
}

impl ScoringService<RandomForest> {
    pub fn from_artifact(artifact: ModelArtifact) -> Self {
        Self::ready(artifact.model)
    }

    /// Load the artifact once. Any failure leaves the service unready instead of aborting.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match ModelArtifact::load(path) {
            Ok(artifact) => {
                info!(
                    path = %path.display(),
                    schema_version = artifact.metadata.schema_version,
                    trained_at = %artifact.metadata.trained_at,
                    trees = artifact.model.trees().len(),
                    "model artifact loaded"
                );
                Self::from_artifact(artifact)
            }
            Err(err) => {
                error!(
                    path = %path.display(),
                    error = %err,
                    "model artifact unavailable; scoring disabled"
                );
                Self::unready(err.to_string())
            }
        }
    }
}
