use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use super::domain::{EvidenceSubmission, ScoreAssignment, SupervisionSubmission, VisitSubmission};
use super::service::{DashboardError, DashboardService};
use crate::records::{Nip, SupervisionType};
use crate::scoring::Instrument;
use crate::store::{RepositoryError, SchoolStore};

/// Router builder exposing the dashboard operations as JSON endpoints.
pub fn dashboard_router<S>(service: Arc<DashboardService<S>>) -> Router
where
    S: SchoolStore + 'static,
{
    Router::new()
        .route("/api/v1/supervisions", post(record_supervision_handler::<S>))
        .route(
            "/api/v1/teachers/:nip/supervisions/latest",
            get(latest_supervisions_handler::<S>),
        )
        .route("/api/v1/visits", post(record_visit_handler::<S>))
        .route(
            "/api/v1/principals/:nip/progress",
            get(principal_progress_handler::<S>),
        )
        .route(
            "/api/v1/principals/:nip/evidence/:document",
            put(submit_evidence_handler::<S>),
        )
        .route(
            "/api/v1/principals/:nip/scores/:document",
            put(assign_score_handler::<S>),
        )
        .route(
            "/api/v1/supervisors/:nip/dashboard",
            get(school_dashboard_handler::<S>),
        )
        .route("/api/v1/instruments/:kind", get(instrument_handler))
        .route(
            "/api/v1/instruments/:kind/preview",
            post(rubric_preview_handler::<S>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DashboardQuery {
    #[serde(default)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PreviewRequest {
    #[serde(default)]
    pub(crate) scores: BTreeMap<String, u32>,
}

pub(crate) fn error_response(error: DashboardError) -> Response {
    let status = match &error {
        DashboardError::UnknownUser(_)
        | DashboardError::Repository(RepositoryError::NotFound(_)) => StatusCode::NOT_FOUND,
        DashboardError::Forbidden { .. } => StatusCode::FORBIDDEN,
        DashboardError::Repository(RepositoryError::Conflict { .. }) => StatusCode::CONFLICT,
        DashboardError::UnknownDocument(_)
        | DashboardError::MissingEvidence { .. }
        | DashboardError::InvalidVisit(_)
        | DashboardError::Rubric(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DashboardError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

fn unknown_instrument(kind: &str) -> Response {
    let payload = json!({ "error": format!("unknown supervision type {kind:?}") });
    (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
}

pub(crate) async fn record_supervision_handler<S>(
    State(service): State<Arc<DashboardService<S>>>,
    axum::Json(submission): axum::Json<SupervisionSubmission>,
) -> Response
where
    S: SchoolStore + 'static,
{
    match service.record_supervision(submission) {
        Ok(report) => (StatusCode::CREATED, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn latest_supervisions_handler<S>(
    State(service): State<Arc<DashboardService<S>>>,
    Path(nip): Path<String>,
) -> Response
where
    S: SchoolStore + 'static,
{
    match service.latest_supervisions(&Nip::new(nip)) {
        Ok(reports) => (StatusCode::OK, axum::Json(reports)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn record_visit_handler<S>(
    State(service): State<Arc<DashboardService<S>>>,
    axum::Json(submission): axum::Json<VisitSubmission>,
) -> Response
where
    S: SchoolStore + 'static,
{
    match service.record_visit(submission) {
        Ok(visit) => (StatusCode::CREATED, axum::Json(visit)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn principal_progress_handler<S>(
    State(service): State<Arc<DashboardService<S>>>,
    Path(nip): Path<String>,
) -> Response
where
    S: SchoolStore + 'static,
{
    let nip = Nip::new(nip);
    match service.principal_progress(&nip) {
        Ok(Some(progress)) => (StatusCode::OK, axum::Json(progress)).into_response(),
        Ok(None) => {
            let payload = json!({
                "nip": nip,
                "error": "no workload record for this nip",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_evidence_handler<S>(
    State(service): State<Arc<DashboardService<S>>>,
    Path((nip, document)): Path<(String, String)>,
    axum::Json(submission): axum::Json<EvidenceSubmission>,
) -> Response
where
    S: SchoolStore + 'static,
{
    match service.submit_evidence(&Nip::new(nip), &document, submission) {
        Ok(progress) => (StatusCode::OK, axum::Json(progress)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn assign_score_handler<S>(
    State(service): State<Arc<DashboardService<S>>>,
    Path((nip, document)): Path<(String, String)>,
    axum::Json(assignment): axum::Json<ScoreAssignment>,
) -> Response
where
    S: SchoolStore + 'static,
{
    match service.assign_workload_score(&Nip::new(nip), &document, assignment) {
        Ok(progress) => (StatusCode::OK, axum::Json(progress)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn school_dashboard_handler<S>(
    State(service): State<Arc<DashboardService<S>>>,
    Path(nip): Path<String>,
    Query(query): Query<DashboardQuery>,
) -> Response
where
    S: SchoolStore + 'static,
{
    let today = query.today.unwrap_or_else(|| Local::now().date_naive());
    match service.school_dashboard(&Nip::new(nip), today) {
        Ok(dashboard) => (StatusCode::OK, axum::Json(dashboard)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn instrument_handler(Path(kind): Path<String>) -> Response {
    match SupervisionType::parse(&kind) {
        Some(kind) => (StatusCode::OK, axum::Json(Instrument::for_type(kind))).into_response(),
        None => unknown_instrument(&kind),
    }
}

pub(crate) async fn rubric_preview_handler<S>(
    State(service): State<Arc<DashboardService<S>>>,
    Path(kind): Path<String>,
    axum::Json(request): axum::Json<PreviewRequest>,
) -> Response
where
    S: SchoolStore + 'static,
{
    let Some(supervision_type) = SupervisionType::parse(&kind) else {
        return unknown_instrument(&kind);
    };
    match service.rubric_preview(supervision_type, &request.scores) {
        Ok(preview) => (StatusCode::OK, axum::Json(preview)).into_response(),
        Err(error) => error_response(error),
    }
}
