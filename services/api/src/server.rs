use crate::cli::ServeArgs;
use crate::infra::{load_classifier, AppState, InMemorySessionStore};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use loan_eligibility::config::AppConfig;
use loan_eligibility::error::AppError;
use loan_eligibility::intake::IntakeService;
use loan_eligibility::scoring::{Classifier, ScoringService};
use loan_eligibility::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (classifier, model_loaded) = load_classifier(&config.scoring.model_path);

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        model_loaded,
    };

    let scoring: Arc<ScoringService<dyn Classifier>> = Arc::new(ScoringService::new(
        classifier,
        config.scoring.credit_policy,
    ));
    let sessions = Arc::new(InMemorySessionStore::new(config.chat.session_ttl));
    let intake_service = Arc::new(IntakeService::new(sessions, scoring.clone()));

    let app = with_service_routes(intake_service, scoring)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        model_loaded,
        credit_floor = config.scoring.credit_policy.floor(),
        "loan eligibility service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
