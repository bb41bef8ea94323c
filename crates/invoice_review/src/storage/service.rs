//! Submission operations over freshly acquired connections.
//!
//! Each call acquires its own connection, runs one repository operation,
//! and drops the connection before returning. `list` is retried on
//! transient failures; other operations surface the first error.

use std::sync::Arc;

use serde_json::{Map, Value};

use invoice_review_core::storage::{retry_transient, ActiveBackend, Result, RetryPolicy};
use invoice_review_core::submission::{InvoiceItem, NewInvoiceItem, Submission, SubmissionStatus};

use super::provider::Connector;

#[derive(Clone)]
pub struct SubmissionService {
    connector: Arc<dyn Connector>,
    retry: RetryPolicy,
}

impl SubmissionService {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            retry: RetryPolicy::default(),
        }
    }

    /// Overrides the retry policy used by [`SubmissionService::list`].
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub async fn create(
        &self,
        image_url: &str,
        extracted_data: Option<&Map<String, Value>>,
    ) -> Result<Submission> {
        let conn = self.connector.acquire().await?;
        let submission = conn.repo().create(image_url, extracted_data).await?;

        tracing::info!(
            submission_id = %submission.id,
            backend = ?conn.backend().backend,
            "Created submission"
        );
        Ok(submission)
    }

    pub async fn get(&self, id: &str) -> Result<Submission> {
        let conn = self.connector.acquire().await?;
        conn.repo().get(id).await
    }

    /// Lists submissions with the given status, newest first.
    ///
    /// Connection-level failures are retried per the configured policy.
    pub async fn list(&self, status: SubmissionStatus) -> Result<Vec<Submission>> {
        retry_transient(&self.retry, |attempt| async move {
            let conn = self.connector.acquire().await?;
            tracing::debug!(attempt, %status, backend = ?conn.backend().backend, "Listing submissions");
            conn.repo().list(status).await
        })
        .await
    }

    pub async fn approve(&self, id: &str, items: &[NewInvoiceItem]) -> Result<()> {
        let conn = self.connector.acquire().await?;
        conn.repo().approve(id, items).await?;

        tracing::info!(submission_id = %id, items = items.len(), "Approved submission");
        Ok(())
    }

    pub async fn items(&self, id: &str) -> Result<Vec<InvoiceItem>> {
        let conn = self.connector.acquire().await?;
        conn.repo().items(id).await
    }

    /// Opens a connection and reports which store answered.
    pub async fn health(&self) -> Result<ActiveBackend> {
        let conn = self.connector.acquire().await?;
        Ok(conn.backend().clone())
    }
}
