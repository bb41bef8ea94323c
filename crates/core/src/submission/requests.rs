//! API request and response types for submission operations.
//!
//! Pure data types with no I/O, shared by the handlers and their tests.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::types::{NewInvoiceItem, SubmissionStatus};

/// Request payload for creating a submission by hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubmissionRequest {
    /// Where the uploaded invoice image is stored.
    pub image_url: String,
    /// Recognition and extraction output. May be partial or absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_data: Option<Map<String, Value>>,
}

impl CreateSubmissionRequest {
    /// Create a request without extracted data.
    pub fn new(image_url: impl Into<String>) -> Self {
        Self {
            image_url: image_url.into(),
            extracted_data: None,
        }
    }

    /// Attach extracted data.
    pub fn with_extracted_data(mut self, data: Map<String, Value>) -> Self {
        self.extracted_data = Some(data);
        self
    }
}

/// Request payload for approving a submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApproveSubmissionRequest {
    pub items: Vec<NewInvoiceItem>,
}

/// Response body returned after a successful approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalResponse {
    pub status: SubmissionStatus,
    pub submission_id: String,
}

impl ApprovalResponse {
    pub fn approved(submission_id: impl Into<String>) -> Self {
        Self {
            status: SubmissionStatus::Approved,
            submission_id: submission_id.into(),
        }
    }
}

/// Query parameters for listing submissions.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ListSubmissionsQuery {
    #[serde(default)]
    pub status: SubmissionStatus,
}
