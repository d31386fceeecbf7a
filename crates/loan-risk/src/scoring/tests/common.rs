use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use crate::scoring::classifier::{Classifier, ClassifierError};
use crate::scoring::encoder::ApplicantRecord;
use crate::scoring::rules::RuleBasedAssessor;
use crate::scoring::schema::{FeatureVector, Label};
use crate::scoring::service::ScoringService;
use crate::scoring::scoring_router;

/// Approves when monthly income reaches the cutoff; probability scales with income.
#[derive(Debug, Clone)]
pub(super) struct IncomeCutoff {
    pub(super) cutoff: f64,
}

impl Classifier for IncomeCutoff {
    fn fit(&mut self, _rows: &[FeatureVector], _labels: &[Label]) -> Result<(), ClassifierError> {
        Ok(())
    }

    fn predict(&self, row: &FeatureVector) -> Result<Label, ClassifierError> {
        Ok(Label::from(row.get(0) >= self.cutoff))
    }

    fn predict_probability(&self, row: &FeatureVector) -> Result<f64, ClassifierError> {
        Ok((row.get(0) / (2.0 * self.cutoff)).clamp(0.0, 1.0))
    }
}

/// Always errors at inference time.
pub(super) struct BrokenModel;

impl Classifier for BrokenModel {
    fn fit(&mut self, _rows: &[FeatureVector], _labels: &[Label]) -> Result<(), ClassifierError> {
        Ok(())
    }

    fn predict(&self, _row: &FeatureVector) -> Result<Label, ClassifierError> {
        Err(ClassifierError::MalformedModel("tree 3 is truncated".to_string()))
    }

    fn predict_probability(&self, _row: &FeatureVector) -> Result<f64, ClassifierError> {
        Err(ClassifierError::MalformedModel("tree 3 is truncated".to_string()))
    }
}

/// Remembers how many rows it was fitted on and predicts the majority label.
#[derive(Debug, Default)]
pub(super) struct MajorityVote {
    pub(super) fitted_rows: usize,
    approved_share: f64,
}

impl Classifier for MajorityVote {
    fn fit(&mut self, rows: &[FeatureVector], labels: &[Label]) -> Result<(), ClassifierError> {
        if rows.is_empty() {
            return Err(ClassifierError::EmptyTrainingSet);
        }
        self.fitted_rows = rows.len();
        let approved = labels.iter().filter(|label| label.is_approved()).count();
        self.approved_share = approved as f64 / labels.len() as f64;
        Ok(())
    }

    fn predict(&self, row: &FeatureVector) -> Result<Label, ClassifierError> {
        Ok(Label::from(self.predict_probability(row)? > 0.5))
    }

    fn predict_probability(&self, _row: &FeatureVector) -> Result<f64, ClassifierError> {
        if self.fitted_rows == 0 {
            return Err(ClassifierError::NotFitted);
        }
        Ok(self.approved_share)
    }
}

pub(super) fn ready_service() -> ScoringService<IncomeCutoff> {
    ScoringService::ready(IncomeCutoff { cutoff: 40_000.0 })
}

pub(super) fn unready_service() -> ScoringService<IncomeCutoff> {
    ScoringService::unready("model artifact not found at credit_risk_model.json")
}

pub(super) fn router_with_service<C: Classifier + 'static>(
    service: ScoringService<C>,
) -> axum::Router {
    scoring_router(Arc::new(service), Arc::new(RuleBasedAssessor::default()))
}

pub(super) fn ideal_candidate() -> ApplicantRecord {
    ApplicantRecord {
        monthly_income: Some(80_000.0),
        credit_score: Some(800.0),
        principal: Some(100_000.0),
        tenure_months: Some(24.0),
        existing_debt: Some(5_000.0),
        employment_status: Some("SALARIED".to_string()),
        loan_purpose: Some("HOME".to_string()),
        interest_rate: None,
    }
}

pub(super) async fn json_body(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    let value = serde_json::from_slice(&bytes).expect("json body");
    (status, value)
}
