use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{AssessmentId, AssessmentSubmission};
use super::evaluation::{EvaluationError, FlightDecision};
use super::repository::{AlertPublisher, AssessmentRepository, RepositoryError};
use super::service::{AssessmentService, AssessmentServiceError};

const STUDENT_HISTORY_LIMIT: usize = 10;
const NO_GO_LIMIT: usize = 50;

/// Router builder exposing HTTP endpoints for the preflight workflow.
pub fn assessment_router<R, A>(service: Arc<AssessmentService<R, A>>) -> Router
where
    R: AssessmentRepository + 'static,
    A: AlertPublisher + 'static,
{
    Router::new()
        .route("/api/v1/preflight/catalog", get(catalog_handler::<R, A>))
        .route(
            "/api/v1/preflight/assessments",
            post(submit_handler::<R, A>),
        )
        .route(
            "/api/v1/preflight/assessments/no-go",
            get(no_go_handler::<R, A>),
        )
        .route(
            "/api/v1/preflight/assessments/:assessment_id",
            get(result_handler::<R, A>),
        )
        .route(
            "/api/v1/preflight/assessments/:assessment_id/override",
            post(override_handler::<R, A>),
        )
        .route(
            "/api/v1/preflight/students/:student_id/assessments",
            get(history_handler::<R, A>),
        )
        .with_state(service)
}

/// Instructor override payload.
#[derive(Debug, Deserialize)]
pub struct OverrideRequest {
    pub instructor_id: String,
    pub reason: String,
    pub result: FlightDecision,
}

pub(crate) async fn catalog_handler<R, A>(
    State(service): State<Arc<AssessmentService<R, A>>>,
) -> Response
where
    R: AssessmentRepository + 'static,
    A: AlertPublisher + 'static,
{
    let view = service.catalog().active_view();
    (StatusCode::OK, axum::Json(view)).into_response()
}

pub(crate) async fn submit_handler<R, A>(
    State(service): State<Arc<AssessmentService<R, A>>>,
    axum::Json(submission): axum::Json<AssessmentSubmission>,
) -> Response
where
    R: AssessmentRepository + 'static,
    A: AlertPublisher + 'static,
{
    match service.submit(submission) {
        Ok(record) => {
            let view = record.result_view();
            (StatusCode::CREATED, axum::Json(view)).into_response()
        }
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn result_handler<R, A>(
    State(service): State<Arc<AssessmentService<R, A>>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    A: AlertPublisher + 'static,
{
    match service.get(&AssessmentId(assessment_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.detail_view())).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn override_handler<R, A>(
    State(service): State<Arc<AssessmentService<R, A>>>,
    Path(assessment_id): Path<String>,
    axum::Json(request): axum::Json<OverrideRequest>,
) -> Response
where
    R: AssessmentRepository + 'static,
    A: AlertPublisher + 'static,
{
    let id = AssessmentId(assessment_id);
    match service.override_decision(&id, &request.instructor_id, &request.reason, request.result)
    {
        Ok(record) => (StatusCode::OK, axum::Json(record.result_view())).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn history_handler<R, A>(
    State(service): State<Arc<AssessmentService<R, A>>>,
    Path(student_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    A: AlertPublisher + 'static,
{
    match service.student_history(&student_id, STUDENT_HISTORY_LIMIT) {
        Ok(records) => {
            let views: Vec<_> = records.iter().map(|record| record.result_view()).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn no_go_handler<R, A>(
    State(service): State<Arc<AssessmentService<R, A>>>,
) -> Response
where
    R: AssessmentRepository + 'static,
    A: AlertPublisher + 'static,
{
    match service.no_go_assessments(NO_GO_LIMIT) {
        Ok(records) => {
            let views: Vec<_> = records.iter().map(|record| record.detail_view()).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => service_error_response(error),
    }
}

fn service_error_response(error: AssessmentServiceError) -> Response {
    match error {
        AssessmentServiceError::Evaluation(EvaluationError::Validation(validation)) => {
            let payload = json!({
                "error": validation.to_string(),
                "issues": validation.issues,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        AssessmentServiceError::Evaluation(error @ EvaluationError::UnknownOption { .. }) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        AssessmentServiceError::Repository(RepositoryError::Conflict) => {
            let payload = json!({ "error": "assessment already exists" });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        AssessmentServiceError::Repository(RepositoryError::NotFound) => {
            let payload = json!({ "error": "assessment not found" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        AssessmentServiceError::MissingOverrideReason => {
            let payload = json!({ "error": "an override reason is required" });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        other => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
