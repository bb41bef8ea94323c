//! Health check endpoint.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::state::AppState;

/// GET /health - Opens a connection and reports which store answered.
///
/// Returns 503 when neither store can be opened.
pub async fn health(State(state): State<AppState>) -> Response {
    match state.submissions.health().await {
        Ok(backend) => (StatusCode::OK, Json(json!({"status": "ok", "db": backend}))).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"status": "unavailable", "error": e.to_string()})),
            )
                .into_response()
        }
    }
}
