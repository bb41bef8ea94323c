mod backend;
mod dialect;
mod error;
mod http_mapping;
mod location;
mod retry;
mod traits;

pub use backend::{truncate_detail, ActiveBackend, BackendKind, SelectionMode, MAX_DETAIL_CHARS};
pub use dialect::{translate, Dialect};
pub use error::{RepositoryError, Result};
pub use http_mapping::repository_error_to_status_code;
pub use location::{resolve_path, StoreLocation, EMBEDDED_SCHEME};
pub use retry::{retry_transient, RetryPolicy};
pub use traits::SubmissionRepository;
