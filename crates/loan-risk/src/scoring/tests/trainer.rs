use super::common::*;

use crate::scoring::classifier::{Classifier, ClassifierError};
use crate::scoring::dataset::TrainingDataset;
use crate::scoring::forest::{ForestConfig, RandomForest};
use crate::scoring::schema::{EmploymentCode, FeatureRow, FeatureVector, Label, PurposeCode};
use crate::scoring::service::ScoringService;
use crate::scoring::trainer::{ModelTrainer, TrainingConfig, TrainingError};

fn small_config(samples: usize) -> TrainingConfig {
    TrainingConfig {
        samples,
        forest: ForestConfig {
            n_trees: 10,
            ..ForestConfig::default()
        },
        ..TrainingConfig::default()
    }
}

fn dataset(rows: usize) -> TrainingDataset {
    let mut dataset = TrainingDataset::with_capacity(rows);
    for index in 0..rows {
        let row = FeatureRow {
            monthly_income: 1_000.0 * index as f64,
            credit_score: 600.0,
            loan_amount: 10_000.0,
            tenure_months: 12.0,
            existing_debt: 0.0,
            employment: EmploymentCode::Salaried,
            purpose: PurposeCode::Personal,
        };
        dataset.push(row.to_vector(), Label::from(index % 3 == 0));
    }
    dataset
}

#[test]
fn default_split_is_eighty_twenty() {
    let trainer = ModelTrainer::new(TrainingConfig::default());
    let mut classifier = MajorityVote::default();

    let evaluation = trainer
        .fit_and_evaluate(&mut classifier, &dataset(4000))
        .expect("evaluated");

    assert_eq!(evaluation.train_rows, 3200);
    assert_eq!(evaluation.test_rows, 800);
    assert_eq!(classifier.fitted_rows, 3200);
    assert_eq!(evaluation.report.support(), 800);
}

#[test]
fn majority_baseline_accuracy_matches_rejected_share() {
    let trainer = ModelTrainer::new(TrainingConfig::default());
    let mut classifier = MajorityVote::default();
    let data = dataset(300);

    let evaluation = trainer
        .fit_and_evaluate(&mut classifier, &data)
        .expect("evaluated");

    assert!(classifier
        .predict(&data.rows()[0])
        .is_ok_and(|label| label == Label::Rejected));
    assert_eq!(evaluation.report.approved.recall, 0.0);
    assert!(evaluation.report.accuracy > 0.5);
}

#[test]
fn classifier_errors_surface_from_evaluation() {
    struct RefusesToFit;

    impl Classifier for RefusesToFit {
        fn fit(&mut self, _rows: &[FeatureVector], _labels: &[Label]) -> Result<(), ClassifierError> {
            Err(ClassifierError::InvalidConfig(
                "n_trees must be positive".to_string(),
            ))
        }

        fn predict(&self, _row: &FeatureVector) -> Result<Label, ClassifierError> {
            Err(ClassifierError::NotFitted)
        }

        fn predict_probability(&self, _row: &FeatureVector) -> Result<f64, ClassifierError> {
            Err(ClassifierError::NotFitted)
        }
    }

    let err = ModelTrainer::new(TrainingConfig::default())
        .fit_and_evaluate(&mut RefusesToFit, &dataset(50))
        .expect_err("fit refused");
    assert!(matches!(
        err,
        TrainingError::Classifier(ClassifierError::InvalidConfig(_))
    ));
}

#[test]
fn zero_samples_fail_before_fitting() {
    let err = ModelTrainer::new(small_config(0))
        .run()
        .expect_err("nothing to train on");
    assert!(matches!(err, TrainingError::Synthetic(_)));
}

#[test]
fn run_produces_a_fitted_artifact() {
    let outcome = ModelTrainer::new(small_config(500))
        .run()
        .expect("trained");

    assert!(outcome.artifact.model.is_fitted());
    assert_eq!(outcome.artifact.model.trees().len(), 10);
    assert_eq!(outcome.artifact.metadata.training_samples, 500);
    assert_eq!(outcome.artifact.metadata.seed, 42);
    assert_eq!(outcome.evaluation.train_rows, 400);
    assert_eq!(outcome.evaluation.test_rows, 100);
    assert!(outcome.artifact.verify().is_ok());
}

#[test]
fn same_config_trains_the_same_forest() {
    let first = ModelTrainer::new(small_config(300)).run().expect("first");
    let second = ModelTrainer::new(small_config(300)).run().expect("second");

    assert_eq!(first.artifact.model.trees(), second.artifact.model.trees());
    assert_eq!(first.evaluation.report, second.evaluation.report);
}

#[test]
fn persist_then_load_round_trips_predictions() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("nested").join("model.json");
    let outcome = ModelTrainer::new(small_config(300)).run().expect("trained");
    outcome.persist(&path).expect("saved");

    let service = ScoringService::<RandomForest>::load(&path);
    assert!(service.is_ready());

    let record = ideal_candidate();
    let expected = ScoringService::ready(outcome.artifact.model.clone())
        .score(&record)
        .expect("in-memory score");
    assert_eq!(service.score(&record).expect("loaded score"), expected);
}
