use crate::cli::ServeArgs;
use crate::infra::{build_store, AppState};
use crate::routes::with_duplicate_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use casework::config::AppConfig;
use casework::error::AppError;
use casework::telemetry;
use casework::workflows::duplicates::DuplicateReviewService;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
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

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(build_store(&config.store)?);
    let review_service = Arc::new(DuplicateReviewService::new(store.clone(), store));

    let app = with_duplicate_routes(review_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer)
        .layer(TimeoutLayer::new(config.server.request_timeout))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        timeout_secs = config.server.request_timeout.as_secs(),
        "duplicate review service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
