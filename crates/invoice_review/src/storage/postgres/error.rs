//! PostgreSQL error classification and mapping.
//!
//! Connection-level failures decide whether the provider falls back to the
//! embedded store, and are the only errors the service retries.

use invoice_review_core::storage::RepositoryError;

/// Returns true if the SQLSTATE belongs to a class that means the server
/// could not be reached or refused the session.
///
/// - `08` connection exception
/// - `28` invalid authorization
/// - `3D` invalid catalog name (database does not exist)
/// - `57P01`..`57P03` shutdown or not yet accepting connections
pub fn is_connection_sqlstate(code: &str) -> bool {
    code.starts_with("08")
        || code.starts_with("28")
        || code.starts_with("3D")
        || code.starts_with("57P0")
}

/// Returns true for failures establishing or keeping a session.
pub fn is_connection_error(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => true,
        sqlx::Error::Database(db_err) => db_err
            .code()
            .is_some_and(|code| is_connection_sqlstate(&code)),
        _ => false,
    }
}

/// Maps a sqlx error to a RepositoryError.
///
/// # Error Mapping
///
/// - Connection-level errors → `RepositoryError::ConnectionFailed`
/// - No rows → `RepositoryError::NotFound`
/// - `23503` foreign key violation, `22P02` invalid text → `RepositoryError::InvalidData`
/// - Decode errors → `RepositoryError::Serialization`
/// - All other errors → `RepositoryError::QueryFailed`
pub fn map_sqlx_error(err: sqlx::Error, entity_type: &'static str, id: &str) -> RepositoryError {
    if is_connection_error(&err) {
        return RepositoryError::ConnectionFailed(err.to_string());
    }

    match &err {
        sqlx::Error::RowNotFound => RepositoryError::NotFound {
            entity_type,
            id: id.to_string(),
        },
        sqlx::Error::Database(db_err)
            if matches!(db_err.code().as_deref(), Some("23503") | Some("22P02")) =>
        {
            RepositoryError::InvalidData(db_err.message().to_string())
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            RepositoryError::Serialization(err.to_string())
        }
        _ => RepositoryError::QueryFailed(err.to_string()),
    }
}
