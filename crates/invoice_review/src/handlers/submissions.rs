use anyhow::{anyhow, Context};
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};

use invoice_review_core::submission::{
    ApprovalResponse, ApproveSubmissionRequest, CreateSubmissionRequest, InvoiceItem,
    ListSubmissionsQuery, Submission,
};

use crate::{
    handlers::{error::BadRequest, AppError},
    state::AppState,
};

/// Create a submission by hand (POST /submissions).
pub async fn create_submission(
    State(state): State<AppState>,
    Json(payload): Json<CreateSubmissionRequest>,
) -> Result<Json<Submission>, AppError> {
    let submission = state
        .submissions
        .create(&payload.image_url, payload.extracted_data.as_ref())
        .await
        .map_err(|e| anyhow!("Database insert failed: {e}"))?;

    Ok(Json(submission))
}

/// Get a single submission (GET /submissions/{id}).
pub async fn get_submission(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Submission>, AppError> {
    let submission = state
        .submissions
        .get(&id)
        .await
        .context("Database query failed")?;

    Ok(Json(submission))
}

/// List submissions by status, newest first (GET /submissions?status=...).
///
/// Defaults to `pending_review`.
pub async fn list_submissions(
    State(state): State<AppState>,
    query: Result<Query<ListSubmissionsQuery>, QueryRejection>,
) -> Result<Json<Vec<Submission>>, AppError> {
    let Query(query) = query.map_err(|e| BadRequest(e.body_text()))?;

    let submissions = state
        .submissions
        .list(query.status)
        .await
        .context("List failed")?;

    Ok(Json(submissions))
}

/// Approve a submission and record its line items
/// (POST /submissions/{id}/approve).
pub async fn approve_submission(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ApproveSubmissionRequest>,
) -> Result<Json<ApprovalResponse>, AppError> {
    state
        .submissions
        .approve(&id, &payload.items)
        .await
        .context("Approval failed")?;

    Ok(Json(ApprovalResponse::approved(id)))
}

/// Line items recorded at approval (GET /submissions/{id}/items).
pub async fn list_items(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<InvoiceItem>>, AppError> {
    let items = state
        .submissions
        .items(&id)
        .await
        .context("Database query failed")?;

    Ok(Json(items))
}
