/// Error handling for the API server
///
/// Handlers return `ApiResult<T>`; every `ApiError` renders as the standard
/// response envelope (see `crate::response`). Internal errors are logged here,
/// which makes this the single sink for unexpected failures.
///
/// # Example
///
/// ```
/// use planboard_api::error::{ApiError, ApiResult};
///
/// fn require_name(name: Option<&str>) -> ApiResult<&str> {
///     name.ok_or_else(|| ApiError::BadRequest("name is required".to_string()))
/// }
///
/// assert!(require_name(None).is_err());
/// ```

use crate::response::Envelope;
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use planboard_shared::error::StoreError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::ValidationErrors;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad request (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Not found (404), also used for malformed identifiers
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unprocessable entity (422) - body validation errors
    #[error("Validation failed: {} errors", .0.len())]
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    InternalError(String),

    /// Service unavailable (503)
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation (`__all__` for cross-field rules)
    pub field: String,

    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, data) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Request validation failed".to_string(),
                Some(json!({ "errors": errors })),
            ),
            ApiError::InternalError(msg) => {
                tracing::error!(error = %msg, "Request failed with internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                    Some(json!({ "error": msg })),
                )
            }
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg, None),
        };

        let body = Envelope {
            status: status.as_u16(),
            message,
            data,
        };

        (status, Json(body)).into_response()
    }
}

/// Store errors that reach a handler unhandled
///
/// Constraint violations a handler cares about (duplicate membership,
/// missing project or user) are matched before this conversion runs.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidDate { .. }
            | StoreError::CheckViolation { .. }
            | StoreError::UniqueViolation { .. }
            | StoreError::ForeignKeyViolation { .. } => ApiError::BadRequest(err.to_string()),
            StoreError::Database(e) => ApiError::InternalError(e.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();

        // field_errors() is a HashMap; keep the output stable
        details.sort_by(|a, b| a.field.cmp(&b.field));
        ApiError::ValidationError(details)
    }
}
