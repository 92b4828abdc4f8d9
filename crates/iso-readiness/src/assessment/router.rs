use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::catalog::QuestionCatalog;
use super::delivery::{AssessmentStore, CrmRelay, ReportMailer};
use super::domain::{Answer, AssessmentId, ChapterResult, UserInfo};
use super::report::{render_report, report_chapters, ReportContext};
use super::scoring;
use super::service::{AssessmentService, AssessmentServiceError};
use super::session::{NavigationAction, SessionError};

/// Router builder exposing the catalog, session lifecycle, and report rendering.
pub fn assessment_router<S, M, C>(service: Arc<AssessmentService<S, M, C>>) -> Router
where
    S: AssessmentStore + 'static,
    M: ReportMailer + 'static,
    C: CrmRelay + 'static,
{
    Router::new()
        .route("/api/v1/catalog", get(catalog_handler))
        .route("/api/v1/assessments", post(start_handler::<S, M, C>))
        .route(
            "/api/v1/assessments/:assessment_id",
            get(snapshot_handler::<S, M, C>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/answers",
            put(answer_handler::<S, M, C>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/navigation",
            post(navigation_handler::<S, M, C>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/complete",
            post(complete_handler::<S, M, C>),
        )
        .route("/api/v1/reports", post(report_handler))
        .with_state(service)
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct NavigationRequest {
    pub(crate) action: NavigationAction,
}

/// Inputs for rendering a report without a session.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ReportRequest {
    #[serde(default)]
    pub(crate) user: UserInfo,
    pub(crate) results: Vec<ChapterResult>,
    #[serde(default)]
    pub(crate) overall_score: Option<u32>,
    #[serde(default)]
    pub(crate) overall_percentage: Option<u8>,
    #[serde(default)]
    pub(crate) report_id: Option<String>,
    #[serde(default)]
    pub(crate) generated_on: Option<NaiveDate>,
}

pub(crate) async fn catalog_handler() -> Response {
    (StatusCode::OK, axum::Json(QuestionCatalog::iso9001())).into_response()
}

pub(crate) async fn start_handler<S, M, C>(
    State(service): State<Arc<AssessmentService<S, M, C>>>,
) -> Response
where
    S: AssessmentStore + 'static,
    M: ReportMailer + 'static,
    C: CrmRelay + 'static,
{
    match service.start() {
        Ok(started) => (StatusCode::CREATED, axum::Json(started)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn snapshot_handler<S, M, C>(
    State(service): State<Arc<AssessmentService<S, M, C>>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    S: AssessmentStore + 'static,
    M: ReportMailer + 'static,
    C: CrmRelay + 'static,
{
    match service.snapshot(&AssessmentId(assessment_id)) {
        Ok(snapshot) => (StatusCode::OK, axum::Json(snapshot)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn answer_handler<S, M, C>(
    State(service): State<Arc<AssessmentService<S, M, C>>>,
    Path(assessment_id): Path<String>,
    axum::Json(answer): axum::Json<Answer>,
) -> Response
where
    S: AssessmentStore + 'static,
    M: ReportMailer + 'static,
    C: CrmRelay + 'static,
{
    match service.record_answer(&AssessmentId(assessment_id), answer) {
        Ok(updated) => (StatusCode::OK, axum::Json(updated)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn navigation_handler<S, M, C>(
    State(service): State<Arc<AssessmentService<S, M, C>>>,
    Path(assessment_id): Path<String>,
    axum::Json(request): axum::Json<NavigationRequest>,
) -> Response
where
    S: AssessmentStore + 'static,
    M: ReportMailer + 'static,
    C: CrmRelay + 'static,
{
    match service.navigate(&AssessmentId(assessment_id), request.action) {
        Ok(snapshot) => (StatusCode::OK, axum::Json(snapshot)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn complete_handler<S, M, C>(
    State(service): State<Arc<AssessmentService<S, M, C>>>,
    Path(assessment_id): Path<String>,
    axum::Json(user): axum::Json<UserInfo>,
) -> Response
where
    S: AssessmentStore + 'static,
    M: ReportMailer + 'static,
    C: CrmRelay + 'static,
{
    // Mail delivery and the report export block; keep them off the async workers.
    let id = AssessmentId(assessment_id);
    let outcome = tokio::task::spawn_blocking(move || service.complete(&id, user)).await;

    match outcome {
        Ok(Ok(completed)) => (StatusCode::OK, axum::Json(completed)).into_response(),
        Ok(Err(error)) => error_response(error),
        Err(join_error) => {
            error!(%join_error, "assessment completion task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(json!({ "error": "assessment completion failed" })),
            )
                .into_response()
        }
    }
}

pub(crate) async fn report_handler(axum::Json(request): axum::Json<ReportRequest>) -> Response {
    let catalog = QuestionCatalog::iso9001();
    let overall = scoring::overall(&request.results);
    let chapters = report_chapters(catalog, &request.results);
    let context = ReportContext {
        report_id: request.report_id,
        generated_on: request
            .generated_on
            .unwrap_or_else(|| Utc::now().date_naive()),
    };

    let html = render_report(
        &request.user,
        &chapters,
        request.overall_score.unwrap_or(overall.score),
        request
            .overall_percentage
            .unwrap_or(overall.percentage)
            .min(100),
        &context,
    );

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
        .into_response()
}

impl AssessmentServiceError {
    /// HTTP status for this failure: client mistakes map to 4xx, a poisoned
    /// session map to 500.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Intake(_) | Self::Session(SessionError::UnknownQuestion(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Session(SessionError::InvalidTransition { .. }) => StatusCode::CONFLICT,
            Self::SessionsUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn error_response(error: AssessmentServiceError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (error.status(), axum::Json(payload)).into_response()
}
