use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Review state of a submission.
///
/// Transitions only move forward: `PendingReview` to `Approved`, once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    #[default]
    PendingReview,
    Approved,
}

impl SubmissionStatus {
    /// Returns the value stored in the `status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::PendingReview => "pending_review",
            SubmissionStatus::Approved => "approved",
        }
    }

    /// Returns true if the submission can no longer change state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionStatus::Approved)
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored status string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown submission status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for SubmissionStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_review" => Ok(SubmissionStatus::PendingReview),
            "approved" => Ok(SubmissionStatus::Approved),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// One uploaded invoice awaiting or past human review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// Globally unique identifier, always surfaced as a string.
    pub id: String,
    pub image_url: String,
    /// Recognition and extraction output. Always an object, possibly empty.
    pub extracted_data: Map<String, Value>,
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
}

/// A confirmed invoice line item owned by a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub id: String,
    pub submission_id: String,
    pub description: Option<String>,
    pub quantity: Option<i64>,
    pub amount: Option<f64>,
    pub confidence: Option<f64>,
}

/// A line item as submitted by a reviewer during approval.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewInvoiceItem {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

impl NewInvoiceItem {
    /// Creates an item with just a description.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::default()
        }
    }

    /// Sets the quantity.
    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Sets the line amount.
    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Sets the reviewer's confidence score.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}
