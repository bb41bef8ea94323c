use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::submission::{InvoiceItem, NewInvoiceItem, Submission, SubmissionStatus};

use super::Result;

/// Repository for submissions and their approval.
///
/// Implementations wrap a single acquired connection. Every returned
/// [`Submission`] is normalized: string id, object `extracted_data`.
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// Inserts a new submission with status `pending_review`.
    async fn create(
        &self,
        image_url: &str,
        extracted_data: Option<&Map<String, Value>>,
    ) -> Result<Submission>;

    /// Gets a submission by id. Fails with `NotFound` when absent.
    async fn get(&self, id: &str) -> Result<Submission>;

    /// Lists submissions with the given status, newest first.
    async fn list(&self, status: SubmissionStatus) -> Result<Vec<Submission>>;

    /// Approves a pending submission and records its line items atomically.
    ///
    /// Fails with `NotFound` when absent and `AlreadyApproved` when the
    /// submission has already been approved; neither inserts any item.
    async fn approve(&self, id: &str, items: &[NewInvoiceItem]) -> Result<()>;

    /// Lists the line items owned by a submission.
    async fn items(&self, id: &str) -> Result<Vec<InvoiceItem>>;
}
