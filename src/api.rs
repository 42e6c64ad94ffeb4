mod client;
mod error;
mod types;

pub use client::OperationsClient;
pub use error::ApiError;
pub use types::{DEFAULT_PAGE_SIZE, ListOperationsResponse};
