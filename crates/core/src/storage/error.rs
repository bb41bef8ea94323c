use thiserror::Error;

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("Submission already approved: {id}")]
    AlreadyApproved { id: String },
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Service unavailable after {attempts} attempts: {last_error}")]
    ServiceUnavailable { attempts: u32, last_error: String },
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl RepositoryError {
    /// Shorthand for a missing submission.
    pub fn submission_not_found(id: impl Into<String>) -> Self {
        RepositoryError::NotFound {
            entity_type: "Submission",
            id: id.into(),
        }
    }

    /// Returns true for failures of the transport rather than the query.
    ///
    /// Only these are worth retrying against the same backend.
    pub fn is_transient(&self) -> bool {
        matches!(self, RepositoryError::ConnectionFailed(_))
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_not_found_display() {
        let error = RepositoryError::submission_not_found("abc-123");
        assert_eq!(error.to_string(), "Submission not found: abc-123");
    }

    #[test]
    fn test_repository_error_already_approved_display() {
        let error = RepositoryError::AlreadyApproved {
            id: "abc-123".to_string(),
        };
        assert_eq!(error.to_string(), "Submission already approved: abc-123");
    }

    #[test]
    fn test_repository_error_connection_failed_display() {
        let error = RepositoryError::ConnectionFailed("timeout after 5s".to_string());
        assert_eq!(error.to_string(), "Connection failed: timeout after 5s");
    }

    #[test]
    fn test_repository_error_service_unavailable_display() {
        let error = RepositoryError::ServiceUnavailable {
            attempts: 4,
            last_error: "Connection failed: reset by peer".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Service unavailable after 4 attempts: Connection failed: reset by peer"
        );
    }

    #[test]
    fn test_repository_error_query_failed_display() {
        let error = RepositoryError::QueryFailed("syntax error".to_string());
        assert_eq!(error.to_string(), "Query failed: syntax error");
    }

    #[test]
    fn test_only_connection_failures_are_transient() {
        assert!(RepositoryError::ConnectionFailed("x".to_string()).is_transient());
        assert!(!RepositoryError::QueryFailed("x".to_string()).is_transient());
        assert!(!RepositoryError::submission_not_found("x").is_transient());
        assert!(!RepositoryError::ServiceUnavailable {
            attempts: 1,
            last_error: "x".to_string()
        }
        .is_transient());
    }
}
