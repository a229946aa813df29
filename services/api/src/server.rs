use crate::cli::ServeArgs;
use crate::infra::{build_wizard, AppState};
use crate::routes::with_service_routes;
use aid_intake::config::AppConfig;
use aid_intake::error::AppError;
use aid_intake::intake::SystemClock;
use aid_intake::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
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
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let wizard = build_wizard(&config, Arc::new(SystemClock)).await;
    let status = wizard.status();
    let wizard = Arc::new(Mutex::new(wizard));

    let app = with_service_routes(wizard)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        resumed_draft = status.has_draft,
        "assistance intake service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
