use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tracing::warn;

use super::merge::{MergeError, MergeRequest};
use super::service::DuplicateReviewService;
use crate::workflows::applicants::{ApplicantRepository, ChildRecordRepository};

/// Router builder exposing duplicate review and merge endpoints.
pub fn duplicates_router<A, C>(service: Arc<DuplicateReviewService<A, C>>) -> Router
where
    A: ApplicantRepository + 'static,
    C: ChildRecordRepository + 'static,
{
    Router::new()
        .route("/api/v1/duplicates", get(list_handler::<A, C>))
        .route("/api/v1/duplicates/merge", post(merge_handler::<A, C>))
        .with_state(service)
}

pub(crate) async fn list_handler<A, C>(
    State(service): State<Arc<DuplicateReviewService<A, C>>>,
) -> Response
where
    A: ApplicantRepository + 'static,
    C: ChildRecordRepository + 'static,
{
    match service.find_duplicates() {
        Ok(groups) => (StatusCode::OK, axum::Json(groups)).into_response(),
        Err(err) => {
            warn!(error = %err, "duplicate scan failed");
            let payload = json!({
                "error": "unable to load applicants, please retry",
                "retryable": true,
            });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn merge_handler<A, C>(
    State(service): State<Arc<DuplicateReviewService<A, C>>>,
    axum::Json(request): axum::Json<MergeRequest>,
) -> Response
where
    A: ApplicantRepository + 'static,
    C: ChildRecordRepository + 'static,
{
    match service.merge(&request) {
        Ok(receipt) => (StatusCode::OK, axum::Json(receipt)).into_response(),
        Err(err) => {
            let status = merge_error_status(&err);
            let duplicate_retained = matches!(
                err,
                MergeError::Reassignment { .. } | MergeError::Delete { .. }
            );
            let payload = json!({
                "error": err.to_string(),
                "reason": err.reason(),
                "retryable": err.is_retryable(),
                "duplicateRetained": duplicate_retained,
            });
            (status, axum::Json(payload)).into_response()
        }
    }
}

fn merge_error_status(err: &MergeError) -> StatusCode {
    match err {
        MergeError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        MergeError::DuplicateNotFound(_) | MergeError::MasterNotFound(_) => StatusCode::NOT_FOUND,
        MergeError::Busy(_) => StatusCode::CONFLICT,
        MergeError::Lookup(_) => StatusCode::SERVICE_UNAVAILABLE,
        MergeError::Reassignment { .. } | MergeError::Delete { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
