//! Functional core for the invoice review service.
//!
//! Pure data types and functions shared by the server: the submission model,
//! the repository contract, the error taxonomy, and the SQL dialect rewriting
//! used by the embedded fallback store.

pub mod storage;
pub mod submission;
