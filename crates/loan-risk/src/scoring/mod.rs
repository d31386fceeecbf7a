//! Loan approval decision pipeline: the synthetic ground-truth model, the feature encoding
//! contract, the classifier capability, and the scoring service that serves it.

pub mod artifact;
pub mod classifier;
pub mod dataset;
pub mod encoder;
pub mod forest;
pub mod metrics;
pub mod router;
pub mod rules;
pub mod schema;
pub mod service;
pub mod synthetic;
pub mod trainer;

#[cfg(test)]
mod tests;

pub use artifact::{ArtifactError, ArtifactMetadata, ModelArtifact};
pub use classifier::{Classifier, ClassifierError};
pub use dataset::{DataSplit, DatasetError, TrainingDataset};
pub use encoder::{encode, employment_code, purpose_code, ApplicantRecord, EncodingError};
pub use forest::{ForestConfig, MaxFeatures, RandomForest};
pub use metrics::{ClassMetrics, ClassificationReport};
pub use router::scoring_router;
pub use rules::RuleBasedAssessor;
pub use schema::{
    EmploymentCode, FeatureRow, FeatureSchema, FeatureVector, Label, PurposeCode,
    FEATURE_COUNT, FEATURE_SCHEMA,
};
pub use service::{Decision, ScoringError, ScoringService, APPROVED_REASON, REJECTED_REASON};
pub use synthetic::{
    approval_score, label_for_score, NormalParams, SyntheticConfig, SyntheticError,
    SyntheticGenerator, APPROVAL_THRESHOLD,
};
pub use trainer::{Evaluation, ModelTrainer, TrainingConfig, TrainingError, TrainingOutcome};
