use crate::infra::{repository_error, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;
use supervisi::dashboard::{dashboard_router, DashboardService};
use supervisi::error::AppError;
use supervisi::roster::{RosterImporter, RosterIssue};
use supervisi::store::MemoryStore;
use tracing::info;

#[derive(Debug, Deserialize)]
pub(crate) struct RosterImportRequest {
    pub(crate) csv: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct RosterImportResponse {
    pub(crate) imported: usize,
    pub(crate) skipped: Vec<RosterIssue>,
}

pub(crate) fn with_dashboard_routes(service: Arc<DashboardService<MemoryStore>>) -> axum::Router {
    dashboard_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/roster/import",
            axum::routing::post(roster_import_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn roster_import_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<RosterImportRequest>,
) -> Result<Json<RosterImportResponse>, AppError> {
    let import = RosterImporter::from_reader(Cursor::new(payload.csv.into_bytes()))?;
    let imported = import
        .apply_to(state.store.as_ref())
        .map_err(repository_error)?;
    info!(imported, skipped = import.skipped.len(), "roster imported over http");

    Ok(Json(RosterImportResponse {
        imported,
        skipped: import.skipped,
    }))
}
