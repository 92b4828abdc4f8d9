use crate::cli::ServeArgs;
use crate::infra::{build_service, ApiService, AppState};
use crate::routes::with_assessment_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use iso_readiness::config::AppConfig;
use iso_readiness::error::AppError;
use iso_readiness::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

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

    let assessment_service = build_service(config.delivery.clone(), config.sessions);
    spawn_session_sweeper(assessment_service.clone());

    let app = with_assessment_routes(assessment_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        report_dir = ?config.delivery.report_dir,
        "iso readiness service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Drops idle sessions even when no new assessment is started.
fn spawn_session_sweeper(service: Arc<ApiService>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            if let Err(error) = service.evict_idle(chrono::Utc::now()) {
                warn!(%error, "session sweep failed");
            }
        }
    });
}
