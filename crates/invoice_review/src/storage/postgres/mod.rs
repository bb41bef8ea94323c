//! PostgreSQL storage backend.
//!
//! The primary store, reached through `sqlx` with one connection per
//! logical operation.

mod conversions;
mod error;
mod repository;
mod schema;

pub use error::is_connection_error;
pub use repository::PostgresRepository;
