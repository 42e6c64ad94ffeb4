//! opwait - wait on cloud long-running operations
//!
//! A library for issuing mutating REST calls that return operation handles
//! and polling those operations with bounded exponential backoff until they
//! finish.

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod operation;
pub mod output;
pub mod reference;
pub mod retry;
pub mod waiter;

pub use api::{ApiError, OperationsClient};
pub use error::OpwaitError;
pub use operation::{Operation, Status};
pub use reference::{OperationRef, ParentDefaults, ReferenceError};
pub use retry::RetryConfig;
pub use waiter::{OperationPoller, ProgressTracker, ResultMode, WaitError, wait_for};
