use loan_risk::config::AppConfig;
use loan_risk::scoring::{RandomForest, ScoringService};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// CLI override first, then the configured artifact location.
pub(crate) fn resolve_model_path(config: &AppConfig, model: Option<PathBuf>) -> PathBuf {
    model.unwrap_or_else(|| config.model.artifact_path.clone())
}

pub(crate) fn load_scoring_service(
    config: &AppConfig,
    model: Option<PathBuf>,
) -> Arc<ScoringService<RandomForest>> {
    let path = resolve_model_path(config, model);
    Arc::new(ScoringService::load(path))
}
