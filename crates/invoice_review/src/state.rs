//! Shared application state passed to all request handlers.

use std::sync::Arc;

use crate::{recognition::Recognizer, storage::SubmissionService};

/// Shared application state.
///
/// Cloned for each request. Holds no connections: every operation on
/// `submissions` opens its own.
#[derive(Clone)]
pub struct AppState {
    pub submissions: SubmissionService,
    pub recognizer: Arc<dyn Recognizer>,
}

impl AppState {
    pub fn new(submissions: SubmissionService, recognizer: Arc<dyn Recognizer>) -> Self {
        Self {
            submissions,
            recognizer,
        }
    }
}
