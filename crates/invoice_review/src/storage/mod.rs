//! Storage backends and connection management.
//!
//! - [`postgres`]: the primary store
//! - [`sqlite`]: the embedded fallback store
//! - [`provider`]: per-operation connections with failover
//! - [`service`]: submission operations with retry

pub mod postgres;
pub mod provider;
mod queries;
pub mod service;
pub mod sqlite;

pub use provider::ConnectionProvider;
pub use service::SubmissionService;
