use crate::cli::ServeArgs;
use crate::infra::{load_store, AppState};
use crate::routes::with_dashboard_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Local;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use supervisi::config::AppConfig;
use supervisi::dashboard::{DashboardService, LiveDashboard};
use supervisi::error::AppError;
use supervisi::telemetry;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(snapshot) = args.snapshot.take() {
        config.data.snapshot_path = Some(snapshot);
    }

    telemetry::init(&config.telemetry)?;

    let store = Arc::new(load_store(
        config.data.snapshot_path.as_deref(),
        args.roster.as_deref(),
    )?);

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        store: store.clone(),
    };

    let dashboard_service = Arc::new(DashboardService::new(store));

    // Held for the lifetime of the server; dropping it stops the refresh task.
    let _live = match args.watch.take() {
        Some(viewer) => {
            let mut live = LiveDashboard::spawn(dashboard_service.clone(), viewer.clone(), || {
                Local::now().date_naive()
            })?;
            let initial = live.current();
            info!(
                viewer = %viewer,
                schools = initial.totals.schools,
                coverage = initial.totals.average_coverage,
                "watching dashboard"
            );
            Some(tokio::spawn(async move {
                while let Some(dashboard) = live.changed().await {
                    info!(
                        viewer = %viewer,
                        schools = dashboard.totals.schools,
                        supervised = dashboard.totals.supervised_teachers,
                        coverage = dashboard.totals.average_coverage,
                        principal_progress = dashboard.totals.average_principal_progress,
                        "dashboard refreshed"
                    );
                }
            }))
        }
        None => None,
    };

    let app = with_dashboard_routes(dashboard_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "supervision dashboard ready");

    axum::serve(listener, app).await?;
    Ok(())
}
