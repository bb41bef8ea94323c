use anyhow::anyhow;
use axum::{
    extract::{Multipart, State},
    Json,
};

use invoice_review_core::submission::{ocr_envelope, Submission, UPLOADED_IMAGE_URL};

use crate::{
    handlers::{error::BadRequest, AppError},
    state::AppState,
};

/// Multipart field carrying the invoice image.
const FILE_FIELD: &str = "file";

/// Upload an invoice image (POST /submissions/upload).
///
/// Runs handwriting recognition on the raw bytes and stores the text as a
/// pending submission.
pub async fn upload_submission(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Submission>, AppError> {
    let mut image = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| BadRequest(e.body_text()))?
    {
        if field.name() == Some(FILE_FIELD) {
            image = Some(field.bytes().await.map_err(|e| BadRequest(e.body_text()))?);
            break;
        }
    }
    let image = image.ok_or_else(|| BadRequest(format!("Missing multipart field `{FILE_FIELD}`")))?;

    tracing::debug!(bytes = image.len(), "Received invoice upload");

    let raw_text = state
        .recognizer
        .recognize(image)
        .await
        .map_err(|e| anyhow!("Upload failed: {e}"))?;

    let extracted_data = ocr_envelope(&raw_text);
    let submission = state
        .submissions
        .create(UPLOADED_IMAGE_URL, Some(&extracted_data))
        .await
        .map_err(|e| anyhow!("Upload failed: {e}"))?;

    Ok(Json(submission))
}
