pub mod error;
pub mod health;
pub mod submissions;
pub mod upload;

pub use error::AppError;
