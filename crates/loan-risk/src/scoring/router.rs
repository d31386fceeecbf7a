use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::json;

use super::classifier::Classifier;
use super::rules::RuleBasedAssessor;
use super::service::{ScoringError, ScoringService};

/// Router exposing the model-backed and rule-based scoring endpoints.
pub fn scoring_router<C>(service: Arc<ScoringService<C>>, rules: Arc<RuleBasedAssessor>) -> Router
where
    C: Classifier + 'static,
{
    let model_routes = Router::new()
        .route("/predict", post(predict_handler::<C>))
        .route("/api/v1/risk/score", post(predict_handler::<C>))
        .with_state(service);

    let rule_routes = Router::new()
        .route("/api/v1/risk/rules", post(rules_handler))
        .with_state(rules);

    model_routes.merge(rule_routes)
}

impl ScoringError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ScoringError::ModelUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            ScoringError::Encoding(_) | ScoringError::Inference(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ScoringError {
    fn into_response(self) -> Response {
        let payload = json!({
            "error": self.to_string(),
        });
        (self.status_code(), axum::Json(payload)).into_response()
    }
}

pub(crate) async fn predict_handler<C>(
    State(service): State<Arc<ScoringService<C>>>,
    body: Bytes,
) -> Response
where
    C: Classifier + 'static,
{
    match service.score_body(&body) {
        Ok(decision) => (StatusCode::OK, axum::Json(decision)).into_response(),
        Err(error) => {
            tracing::warn!(error = %error, "scoring request failed");
            error.into_response()
        }
    }
}

pub(crate) async fn rules_handler(
    State(rules): State<Arc<RuleBasedAssessor>>,
    body: Bytes,
) -> Response {
    match rules.assess_body(&body) {
        Ok(decision) => (StatusCode::OK, axum::Json(decision)).into_response(),
        Err(error) => error.into_response(),
    }
}
