use std::path::Path;

use tracing::info;

use super::artifact::{ArtifactError, ArtifactMetadata, ModelArtifact};
use super::classifier::{Classifier, ClassifierError};
use super::dataset::{DatasetError, TrainingDataset};
use super::forest::{ForestConfig, RandomForest};
use super::metrics::ClassificationReport;
use super::schema::Label;
use super::synthetic::{SyntheticConfig, SyntheticError, SyntheticGenerator};

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    pub samples: usize,
    pub seed: u64,
    pub split_seed: u64,
    pub test_fraction: f64,
    pub forest: ForestConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            samples: 4000,
            seed: 42,
            split_seed: 42,
            test_fraction: 0.2,
            forest: ForestConfig::default(),
        }
    }
}

impl TrainingConfig {
    pub fn synthetic(&self) -> SyntheticConfig {
        SyntheticConfig {
            samples: self.samples,
            seed: self.seed,
            ..SyntheticConfig::default()
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error(transparent)]
    Synthetic(#[from] SyntheticError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error("classifier failed: {0}")]
    Classifier(#[from] ClassifierError),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Held-out diagnostics for one fit.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub train_rows: usize,
    pub test_rows: usize,
    pub report: ClassificationReport,
}

#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub artifact: ModelArtifact,
    pub evaluation: Evaluation,
}

impl TrainingOutcome {
    /// Overwrite the artifact at `path`. Only reachable after fitting has completed.
    pub fn persist(&self, path: impl AsRef<Path>) -> Result<(), TrainingError> {
        let path = path.as_ref();
        self.artifact.save(path)?;
        info!(path = %path.display(), "model artifact saved");
        Ok(())
    }
}

/// Offline batch job: generate, split, fit, evaluate.
pub struct ModelTrainer {
    config: TrainingConfig,
}

impl ModelTrainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn run(&self) -> Result<TrainingOutcome, TrainingError> {
        info!(
            samples = self.config.samples,
            seed = self.config.seed,
            "generating synthetic data"
        );
        let dataset = SyntheticGenerator::new(self.config.synthetic()).generate()?;
        self.train_on(&dataset)
    }

    pub fn train_on(&self, dataset: &TrainingDataset) -> Result<TrainingOutcome, TrainingError> {
        info!(trees = self.config.forest.n_trees, "training random forest");
        let mut model = RandomForest::new(self.config.forest.clone());
        let evaluation = self.fit_and_evaluate(&mut model, dataset)?;

        let metadata = ArtifactMetadata::current(dataset.len(), self.config.seed);
        Ok(TrainingOutcome {
            artifact: ModelArtifact::new(metadata, model),
            evaluation,
        })
    }

    /// Split `dataset`, fit `classifier` on the train partition, and score the test partition.
    pub fn fit_and_evaluate<C: Classifier>(
        &self,
        classifier: &mut C,
        dataset: &TrainingDataset,
    ) -> Result<Evaluation, TrainingError> {
        let split = dataset.split(self.config.test_fraction, self.config.split_seed)?;
        classifier.fit(split.train.rows(), split.train.labels())?;

        let predicted = split
            .test
            .rows()
            .iter()
            .map(|row| classifier.predict(row))
            .collect::<Result<Vec<Label>, _>>()?;
        let report = ClassificationReport::from_predictions(split.test.labels(), &predicted);

        info!(
            accuracy = report.accuracy,
            train = split.train.len(),
            test = split.test.len(),
            "model evaluated"
        );

        Ok(Evaluation {
            train_rows: split.train.len(),
            test_rows: split.test.len(),
            report,
        })
    }
}
