use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::screening::store::StoreError;
use crate::screening::PipelineError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "X-Tenant-Id and X-User-Id headers are required".to_string(),
            ),
            AppError::Pipeline(e) => match e {
                PipelineError::UnsupportedFormat(_) => (
                    StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    "UNSUPPORTED_FORMAT",
                    e.to_string(),
                ),
                PipelineError::ParseFailure(_) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "PARSE_FAILURE",
                    e.to_string(),
                ),
                PipelineError::EmptyExtraction => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "EMPTY_EXTRACTION",
                    e.to_string(),
                ),
                PipelineError::OpeningNotFound(_) => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string())
                }
                // details were logged by the pipeline span
                PipelineError::PersistenceFailure(_) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "PERSISTENCE_FAILURE",
                    "The candidate profile could not be stored; retry the upload".to_string(),
                ),
            },
            AppError::Store(e) => {
                tracing::error!("Store error: {e}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORE_UNAVAILABLE",
                    "A storage error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_pipeline_errors_map_to_statuses() {
        assert_eq!(
            status_of(PipelineError::UnsupportedFormat("image/png".into()).into()),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            status_of(PipelineError::ParseFailure("bad xref".into()).into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(PipelineError::EmptyExtraction.into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(PipelineError::OpeningNotFound(Uuid::nil()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(PipelineError::PersistenceFailure("timeout".into()).into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_missing_identity_is_unauthorized() {
        assert_eq!(status_of(AppError::Unauthorized), StatusCode::UNAUTHORIZED);
    }
}
