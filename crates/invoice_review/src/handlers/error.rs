use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use invoice_review_core::storage::{repository_error_to_status_code, RepositoryError};
use serde_json::json;

/// Handler error. Rendered as `{"detail": <message>}`.
///
/// The status comes from a [`RepositoryError`] or [`BadRequest`] anywhere in
/// the chain; anything else is a 500.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

/// Malformed client input.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct BadRequest(pub String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, detail) =
            if let Some(repo_error) = self.0.downcast_ref::<RepositoryError>() {
                let code = StatusCode::from_u16(repository_error_to_status_code(repo_error))
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                // Client errors carry their own message; context is for server logs.
                if code.is_client_error() {
                    (code, repo_error.to_string())
                } else {
                    (code, format!("{:#}", self.0))
                }
            } else if let Some(bad_request) = self.0.downcast_ref::<BadRequest>() {
                (StatusCode::BAD_REQUEST, bad_request.to_string())
            } else {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", self.0))
            };

        if status_code.is_server_error() {
            tracing::error!(status = status_code.as_u16(), error = %detail, "Request failed");
        }

        (status_code, Json(json!({ "detail": detail }))).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
