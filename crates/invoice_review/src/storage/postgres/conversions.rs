//! PostgreSQL row conversion functions.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{postgres::PgRow, Row};

use invoice_review_core::storage::{RepositoryError, Result};
use invoice_review_core::submission::{extracted_data_from_value, InvoiceItem, Submission};

fn decode_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Serialization(e.to_string())
}

/// Convert a PostgreSQL row to a Submission.
///
/// Expected columns: id, image_url, extracted_data, status, created_at
pub fn row_to_submission(row: &PgRow) -> Result<Submission> {
    let status: String = row.try_get("status").map_err(decode_err)?;
    let extracted_data: Option<Value> = row.try_get("extracted_data").map_err(decode_err)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(decode_err)?;

    Ok(Submission {
        id: row.try_get("id").map_err(decode_err)?,
        image_url: row.try_get("image_url").map_err(decode_err)?,
        extracted_data: extracted_data_from_value(extracted_data),
        status: status
            .parse()
            .map_err(|e: invoice_review_core::submission::UnknownStatus| {
                RepositoryError::Serialization(e.to_string())
            })?,
        created_at,
    })
}

/// Convert a PostgreSQL row to an InvoiceItem.
///
/// Expected columns: id, submission_id, description, quantity, amount, confidence
pub fn row_to_item(row: &PgRow) -> Result<InvoiceItem> {
    Ok(InvoiceItem {
        id: row.try_get("id").map_err(decode_err)?,
        submission_id: row.try_get("submission_id").map_err(decode_err)?,
        description: row.try_get("description").map_err(decode_err)?,
        quantity: row.try_get("quantity").map_err(decode_err)?,
        amount: row.try_get("amount").map_err(decode_err)?,
        confidence: row.try_get("confidence").map_err(decode_err)?,
    })
}
