use crate::cli::ServeArgs;
use crate::infra::{decision_service, AppState};
use crate::routes::with_financing_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use financing_intake::config::AppConfig;
use financing_intake::error::AppError;
use financing_intake::telemetry;
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

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = decision_service(&config.scoring);
    let scoring = service.scoring_status();

    let app = with_financing_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        scoring_mode = ?scoring.mode,
        threshold = scoring.threshold,
        "financing intake service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
