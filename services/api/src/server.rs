use crate::cli::ServeArgs;
use crate::infra::{load_scoring_service, AppState};
use crate::routes::with_scoring_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use loan_risk::config::AppConfig;
use loan_risk::error::AppError;
use loan_risk::scoring::RuleBasedAssessor;
use loan_risk::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let scoring_service = load_scoring_service(&config, args.model.take());
    let model_ready = scoring_service.is_ready();
    let rules = Arc::new(RuleBasedAssessor::default());

    let app = with_scoring_routes(scoring_service, rules)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(model_ready, Ordering::Release);

    if model_ready {
        info!(?config.environment, %addr, "loan scoring service ready");
    } else {
        warn!(?config.environment, %addr, "loan scoring service started without a model");
    }

    axum::serve(listener, app).await?;
    Ok(())
}
