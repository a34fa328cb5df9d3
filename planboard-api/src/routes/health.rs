/// Health check endpoint
///
/// ```text
/// GET /health
/// ```
///
/// ```json
/// {
///   "status": 200,
///   "message": "Service is healthy",
///   "data": { "version": "0.1.0", "database": "connected" }
/// }
/// ```
///
/// Responds 503 when the database cannot be reached.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response::ApiResponse,
};
use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Health check payload
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthData {
    /// Application version
    pub version: String,

    /// Database status
    pub database: String,
}

pub async fn health_check(State(state): State<AppState>) -> ApiResult<ApiResponse<HealthData>> {
    if let Err(e) = state.projects.ping().await {
        warn!(error = %e, "Health check failed: database unreachable");
        return Err(ApiError::ServiceUnavailable(
            "Database is not reachable".to_string(),
        ));
    }

    Ok(ApiResponse::ok(
        "Service is healthy",
        HealthData {
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: "connected".to_string(),
        },
    ))
}
