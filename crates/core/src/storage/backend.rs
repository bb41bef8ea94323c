//! Descriptor of the store that served a connection.
//!
//! Returned with every acquired connection and reported by the health check.
//! Diagnostic only: nothing branches on it for correctness.

use serde::{Deserialize, Serialize};

use super::Dialect;

/// Maximum length of the diagnostic detail, in characters.
pub const MAX_DETAIL_CHARS: usize = 160;

/// Which store is serving requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Primary,
    Fallback,
}

/// How the store was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Configuration names the embedded store directly.
    Explicit,
    /// Primary first, embedded store on connection failure.
    Automatic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveBackend {
    pub backend: BackendKind,
    pub mode: SelectionMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ActiveBackend {
    /// The primary store answered.
    pub fn primary() -> Self {
        Self {
            backend: BackendKind::Primary,
            mode: SelectionMode::Automatic,
            detail: None,
        }
    }

    /// The embedded store was configured explicitly.
    pub fn explicit_embedded(location: &str) -> Self {
        Self {
            backend: BackendKind::Fallback,
            mode: SelectionMode::Explicit,
            detail: Some(truncate_detail(location)),
        }
    }

    /// The primary store failed and the embedded store took over.
    pub fn failover(reason: &str) -> Self {
        Self {
            backend: BackendKind::Fallback,
            mode: SelectionMode::Automatic,
            detail: Some(truncate_detail(reason)),
        }
    }

    /// Dialect the active store speaks.
    pub fn dialect(&self) -> Dialect {
        match self.backend {
            BackendKind::Primary => Dialect::Postgres,
            BackendKind::Fallback => Dialect::Sqlite,
        }
    }
}

/// Caps a diagnostic message at [`MAX_DETAIL_CHARS`] characters.
pub fn truncate_detail(message: &str) -> String {
    message.chars().take(MAX_DETAIL_CHARS).collect()
}
