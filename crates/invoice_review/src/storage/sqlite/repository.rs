//! SQLite repository implementation.
//!
//! Implements [`SubmissionRepository`] from `invoice_review_core::storage`
//! using SQLite. Shared statements are written in the primary dialect and
//! translated before execution.

use std::{path::Path, time::Duration};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, TransactionBehavior};
use serde_json::{Map, Value};
use tokio_rusqlite::Connection;
use uuid::Uuid;

use invoice_review_core::storage::{
    translate, Dialect, RepositoryError, Result, SubmissionRepository,
};
use invoice_review_core::submission::{
    encode_extracted_data, InvoiceItem, NewInvoiceItem, Submission, SubmissionStatus,
};

use super::conversions::{format_datetime, parse_status, row_to_item, row_to_submission};
use super::error::map_tokio_rusqlite_error;
use super::schema;
use crate::storage::queries;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

/// Result of the locked status check inside an approval transaction.
enum ApproveOutcome {
    Approved,
    Missing,
    AlreadyApproved,
}

/// SQLite-based repository implementation.
///
/// Owns a single connection; dropping the repository closes it.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Opens the database file, creating it and its parent directories if
    /// missing, and ensures the schema exists.
    pub async fn open(path: &Path, busy_timeout: Duration) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                RepositoryError::ConnectionFailed(format!(
                    "Cannot create directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init(&conn, busy_timeout).await?;

        Ok(Self { conn })
    }

    /// Opens an in-memory database. Data is lost when the repository is dropped.
    #[cfg(test)]
    pub async fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init(&conn, Duration::from_millis(100)).await?;

        Ok(Self { conn })
    }

    /// Configure the connection and apply the schema once per fresh file.
    async fn init(conn: &Connection, busy_timeout: Duration) -> Result<()> {
        conn.call(move |conn| {
            conn.busy_timeout(busy_timeout).map_err(wrap_err)?;

            if let Err(e) = conn.pragma_update(None, "foreign_keys", true) {
                tracing::warn!(error = %e, "Could not enable SQLite foreign keys");
            }

            let version: i64 = conn
                .pragma_query_value(None, "user_version", |row| row.get(0))
                .map_err(wrap_err)?;

            if version < schema::SCHEMA_VERSION {
                conn.execute_batch(schema::CREATE_TABLES).map_err(wrap_err)?;
                conn.pragma_update(None, "user_version", schema::SCHEMA_VERSION)
                    .map_err(wrap_err)?;
                tracing::info!(version = schema::SCHEMA_VERSION, "Applied SQLite schema");
            }

            Ok(())
        })
        .await
        .map_err(|e| map_tokio_rusqlite_error(e, "Schema", ""))
    }
}

#[async_trait]
impl SubmissionRepository for SqliteRepository {
    async fn create(
        &self,
        image_url: &str,
        extracted_data: Option<&Map<String, Value>>,
    ) -> Result<Submission> {
        let id = Uuid::new_v4().to_string();
        let image_url = image_url.to_string();
        let extracted_data = encode_extracted_data(extracted_data);
        let created_at = format_datetime(&Utc::now());
        let submission_id = id.clone();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::INSERT_SUBMISSION).map_err(wrap_err)?;
                let submission = stmt
                    .query_row(
                        params![
                            submission_id,
                            image_url,
                            extracted_data,
                            SubmissionStatus::PendingReview.as_str(),
                            created_at
                        ],
                        row_to_submission,
                    )
                    .map_err(wrap_err)?;
                Ok(submission)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Submission", id))
    }

    async fn get(&self, id: &str) -> Result<Submission> {
        let sql = translate(queries::SELECT_SUBMISSION_BY_ID, Dialect::Sqlite).into_owned();
        let id_str = id.to_string();

        let submission = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql).map_err(wrap_err)?;
                let submission = stmt
                    .query_row([&id_str], row_to_submission)
                    .optional()
                    .map_err(wrap_err)?;
                Ok(submission)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Submission", id))?;

        submission.ok_or_else(|| RepositoryError::submission_not_found(id))
    }

    async fn list(&self, status: SubmissionStatus) -> Result<Vec<Submission>> {
        let sql = translate(queries::SELECT_SUBMISSIONS_BY_STATUS, Dialect::Sqlite).into_owned();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql).map_err(wrap_err)?;
                let rows = stmt
                    .query_map([status.as_str()], row_to_submission)
                    .map_err(wrap_err)?;

                let mut submissions = Vec::new();
                for row_result in rows {
                    submissions.push(row_result.map_err(wrap_err)?);
                }
                Ok(submissions)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Submission", status.as_str()))
    }

    async fn approve(&self, id: &str, items: &[NewInvoiceItem]) -> Result<()> {
        let select_sql =
            translate(queries::SELECT_SUBMISSION_STATUS_FOR_UPDATE, Dialect::Sqlite).into_owned();
        let update_sql = translate(queries::UPDATE_SUBMISSION_STATUS, Dialect::Sqlite).into_owned();
        let id_str = id.to_string();
        let items = items.to_vec();

        let outcome = self
            .conn
            .call(move |conn| {
                // IMMEDIATE takes the write lock before the status read, so a
                // concurrent approval waits here and then sees `approved`.
                let tx = conn
                    .transaction_with_behavior(TransactionBehavior::Immediate)
                    .map_err(wrap_err)?;

                let status: Option<String> = tx
                    .query_row(&select_sql, [&id_str], |row| row.get("status"))
                    .optional()
                    .map_err(wrap_err)?;
                let status = status
                    .map(|s| parse_status(&s))
                    .transpose()
                    .map_err(wrap_err)?;

                match status {
                    None => return Ok(ApproveOutcome::Missing),
                    Some(status) if status.is_terminal() => {
                        return Ok(ApproveOutcome::AlreadyApproved)
                    }
                    Some(_) => {}
                }

                {
                    let mut insert = tx.prepare(schema::INSERT_ITEM).map_err(wrap_err)?;
                    for item in &items {
                        insert
                            .execute(params![
                                Uuid::new_v4().to_string(),
                                id_str,
                                item.description,
                                item.quantity,
                                item.amount,
                                item.confidence
                            ])
                            .map_err(wrap_err)?;
                    }
                }

                tx.execute(
                    &update_sql,
                    params![id_str, SubmissionStatus::Approved.as_str()],
                )
                .map_err(wrap_err)?;
                tx.commit().map_err(wrap_err)?;

                Ok(ApproveOutcome::Approved)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Submission", id))?;

        match outcome {
            ApproveOutcome::Approved => Ok(()),
            ApproveOutcome::Missing => Err(RepositoryError::submission_not_found(id)),
            ApproveOutcome::AlreadyApproved => Err(RepositoryError::AlreadyApproved {
                id: id.to_string(),
            }),
        }
    }

    async fn items(&self, id: &str) -> Result<Vec<InvoiceItem>> {
        let select_sql = translate(queries::SELECT_SUBMISSION_STATUS, Dialect::Sqlite).into_owned();
        let id_str = id.to_string();

        let items = self
            .conn
            .call(move |conn| {
                let exists = conn
                    .query_row(&select_sql, [&id_str], |_| Ok(()))
                    .optional()
                    .map_err(wrap_err)?
                    .is_some();
                if !exists {
                    return Ok(None);
                }

                let mut stmt = conn
                    .prepare(schema::SELECT_ITEMS_BY_SUBMISSION)
                    .map_err(wrap_err)?;
                let rows = stmt.query_map([&id_str], row_to_item).map_err(wrap_err)?;

                let mut items = Vec::new();
                for row_result in rows {
                    items.push(row_result.map_err(wrap_err)?);
                }
                Ok(Some(items))
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "InvoiceItem", id))?;

        items.ok_or_else(|| RepositoryError::submission_not_found(id))
    }
}
