//! PostgreSQL repository implementation.
//!
//! Implements [`SubmissionRepository`] over a single `PgConnection`. The
//! connection is opened per logical operation by the provider and closed
//! when the repository is dropped.

use std::{io, time::Duration};

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{
    postgres::{PgConnectOptions, PgConnection},
    Connection,
};
use tokio::sync::Mutex;
use uuid::Uuid;

use invoice_review_core::storage::{RepositoryError, Result, SubmissionRepository};
use invoice_review_core::submission::{
    encode_extracted_data, InvoiceItem, NewInvoiceItem, Submission, SubmissionStatus,
};

use super::conversions::{row_to_item, row_to_submission};
use super::error::map_sqlx_error;
use super::schema;
use crate::storage::queries;

/// PostgreSQL-based repository implementation.
pub struct PostgresRepository {
    conn: Mutex<PgConnection>,
}

impl PostgresRepository {
    /// Connects within `timeout`.
    ///
    /// Returns the raw driver error so the caller can decide whether it is
    /// worth falling back. A timeout surfaces as an I/O error.
    pub async fn connect(
        options: &PgConnectOptions,
        timeout: Duration,
    ) -> std::result::Result<Self, sqlx::Error> {
        let conn = tokio::time::timeout(timeout, PgConnection::connect_with(options))
            .await
            .map_err(|_| {
                sqlx::Error::Io(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("connection timed out after {}s", timeout.as_secs_f32()),
                ))
            })??;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Applies the primary schema. Idempotent.
    pub async fn migrate(&self) -> Result<()> {
        let mut conn = self.conn.lock().await;

        sqlx::raw_sql(schema::CREATE_TABLES)
            .execute(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error(e, "Schema", ""))?;

        tracing::info!("Applied PostgreSQL schema");
        Ok(())
    }
}

/// Primary keys are UUIDs; anything else cannot match a row.
fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|_| RepositoryError::submission_not_found(id))
}

#[async_trait]
impl SubmissionRepository for PostgresRepository {
    async fn create(
        &self,
        image_url: &str,
        extracted_data: Option<&Map<String, Value>>,
    ) -> Result<Submission> {
        let mut conn = self.conn.lock().await;

        let row = sqlx::query(schema::INSERT_SUBMISSION)
            .bind(image_url)
            .bind(encode_extracted_data(extracted_data))
            .bind(SubmissionStatus::PendingReview.as_str())
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error(e, "Submission", ""))?;

        row_to_submission(&row)
    }

    async fn get(&self, id: &str) -> Result<Submission> {
        let uuid = parse_id(id)?;
        let mut conn = self.conn.lock().await;

        let row = sqlx::query(queries::SELECT_SUBMISSION_BY_ID)
            .bind(uuid.to_string())
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error(e, "Submission", id))?
            .ok_or_else(|| RepositoryError::submission_not_found(id))?;

        row_to_submission(&row)
    }

    async fn list(&self, status: SubmissionStatus) -> Result<Vec<Submission>> {
        let mut conn = self.conn.lock().await;

        let rows = sqlx::query(queries::SELECT_SUBMISSIONS_BY_STATUS)
            .bind(status.as_str())
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error(e, "Submission", status.as_str()))?;

        rows.iter().map(row_to_submission).collect()
    }

    async fn approve(&self, id: &str, items: &[NewInvoiceItem]) -> Result<()> {
        let uuid = parse_id(id)?.to_string();
        let mut conn = self.conn.lock().await;
        let map_err = |e| map_sqlx_error(e, "Submission", id);

        let mut tx = conn.begin().await.map_err(map_err)?;

        // Row lock: a concurrent approval blocks here until we commit.
        let row = sqlx::query(queries::SELECT_SUBMISSION_STATUS_FOR_UPDATE)
            .bind(&uuid)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_err)?
            .ok_or_else(|| RepositoryError::submission_not_found(id))?;

        let status: String = sqlx::Row::try_get(&row, "status")
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        if status == SubmissionStatus::Approved.as_str() {
            return Err(RepositoryError::AlreadyApproved { id: id.to_string() });
        }

        for item in items {
            sqlx::query(schema::INSERT_ITEM)
                .bind(&uuid)
                .bind(item.description.as_deref())
                .bind(item.quantity)
                .bind(item.amount)
                .bind(item.confidence)
                .execute(&mut *tx)
                .await
                .map_err(map_err)?;
        }

        sqlx::query(queries::UPDATE_SUBMISSION_STATUS)
            .bind(&uuid)
            .bind(SubmissionStatus::Approved.as_str())
            .execute(&mut *tx)
            .await
            .map_err(map_err)?;

        tx.commit().await.map_err(map_err)?;

        tracing::debug!(submission_id = %id, items = items.len(), "Approved submission");
        Ok(())
    }

    async fn items(&self, id: &str) -> Result<Vec<InvoiceItem>> {
        let uuid = parse_id(id)?.to_string();
        let mut conn = self.conn.lock().await;

        let exists = sqlx::query(queries::SELECT_SUBMISSION_STATUS)
            .bind(&uuid)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error(e, "Submission", id))?
            .is_some();
        if !exists {
            return Err(RepositoryError::submission_not_found(id));
        }

        let rows = sqlx::query(schema::SELECT_ITEMS_BY_SUBMISSION)
            .bind(&uuid)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error(e, "InvoiceItem", id))?;

        rows.iter().map(row_to_item).collect()
    }
}
