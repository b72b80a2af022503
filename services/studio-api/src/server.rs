use crate::backend::HttpBackend;
use crate::cli::ServeArgs;
use crate::infra::{AppState, HubSettings, StudioHub};
use crate::routes::with_studio_routes;
use audit_studio::config::AppConfig;
use audit_studio::error::AppError;
use audit_studio::telemetry;
use audit_studio::StudioState;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::{AtomicBool, Ordering};
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
    if let Some(url) = args.backend_url.take() {
        config.studio.backend_url = url.trim_end_matches('/').to_string();
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let backend = HttpBackend::new(
        config.studio.backend_url.clone(),
        config.studio.backend_timeout,
    )
    .map_err(|err| AppError::Io(std::io::Error::other(err)))?;
    let hub = Arc::new(StudioHub::new(
        StudioState::new(config.studio.calibration.clone()),
        Arc::new(backend),
        HubSettings {
            tour_interval: config.studio.tour_interval,
            toast_hide: config.studio.toast_hide,
            backend_timeout: config.studio.backend_timeout,
        },
    ));

    let app = with_studio_routes(hub)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        backend = %config.studio.backend_url,
        "audit studio ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
