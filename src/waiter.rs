//! Waiting on long-running operations.
//!
//! A mutating call returns an operation handle; [`wait_for`] polls it with
//! bounded exponential backoff until it is terminal and then returns the
//! result, or the server-reported error. A non-terminal operation is never
//! returned.

mod poller;
mod progress;

pub use poller::{CloudOperationPoller, CloudOperationPollerNoResources, check_done};
pub use progress::ProgressTracker;

use std::future::Future;

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::Instant;

use crate::api::{ApiError, OperationsClient};
use crate::operation::{Operation, Status};
use crate::reference::OperationRef;
use crate::retry::RetryConfig;

#[derive(Debug, Error)]
pub enum WaitError {
    #[error("operation [{name}] failed: {} ({}: {})", .status.message, .status.code_name(), .status.code)]
    Operation { name: String, status: Status },

    #[error(
        "Operation [{name}] has not finished in {seconds} seconds. The operation may still be \
         underway remotely and may still succeed; use `opwait operations describe` to check its state."
    )]
    Timeout { name: String, seconds: u64 },

    #[error("Aborting wait for operation [{name}].")]
    Aborted { name: String },

    #[error("operation [{name}] finished without a result resource name")]
    MissingResult { name: String },

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// What to hand back once an operation is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ResultMode {
    /// Fetch the resource named by `response.name`
    Resource,
    /// Return the embedded `response` payload
    Response,
}

#[async_trait]
pub trait OperationPoller: Send + Sync {
    fn name(&self) -> &str;

    /// Fetches the current state of the operation.
    async fn poll(&self, reference: &OperationRef) -> Result<Operation, WaitError>;

    /// True once terminal; errors when the terminal state is a failure.
    fn is_done(&self, operation: &Operation) -> Result<bool, WaitError>;

    /// Extracts the result of a successfully completed operation.
    async fn get_result(&self, operation: Operation) -> Result<serde_json::Value, WaitError>;
}

pub fn get_poller(mode: ResultMode, client: OperationsClient) -> Box<dyn OperationPoller> {
    match mode {
        ResultMode::Resource => Box::new(CloudOperationPoller::new(client)),
        ResultMode::Response => Box::new(CloudOperationPollerNoResources::new(client)),
    }
}

/// Polls until the operation is terminal and returns it.
///
/// `on_status` is invoked with every polled state. Transport and HTTP errors
/// propagate immediately.
pub async fn poll_until_done<F>(
    poller: &dyn OperationPoller,
    reference: &OperationRef,
    config: &RetryConfig,
    mut on_status: F,
) -> Result<Operation, WaitError>
where
    F: FnMut(&Operation),
{
    let started = Instant::now();
    let name = reference.relative_name();

    if !config.pre_start_sleep.is_zero() {
        tokio::time::sleep(config.pre_start_sleep).await;
    }

    let mut backoff = config.backoff();

    loop {
        let operation = poller.poll(reference).await?;
        on_status(&operation);

        if poller.is_done(&operation)? {
            tracing::info!(
                operation = %name,
                attempt = backoff.attempt() + 1,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "operation finished"
            );
            return Ok(operation);
        }

        let elapsed = started.elapsed();
        match backoff.next_delay(elapsed) {
            Some(delay) => {
                tracing::debug!(
                    operation = %name,
                    attempt = backoff.attempt(),
                    delay_ms = delay.as_millis() as u64,
                    "operation not done, sleeping"
                );
                tokio::time::sleep(delay).await;
            }
            None => {
                let seconds = elapsed.as_secs();
                tracing::warn!(operation = %name, seconds, "gave up waiting for operation");
                return Err(WaitError::Timeout { name, seconds });
            }
        }
    }
}

/// Waits for the operation and returns its result, aborting on Ctrl-C.
pub async fn wait_for(
    poller: &dyn OperationPoller,
    reference: &OperationRef,
    message: &str,
    config: &RetryConfig,
    progress: &mut ProgressTracker,
) -> Result<serde_json::Value, WaitError> {
    let interrupted = async {
        if tokio::signal::ctrl_c().await.is_err() {
            // NOTE: Without a signal handler the wait can only end by itself
            std::future::pending::<()>().await;
        }
    };
    wait_for_until(poller, reference, message, config, progress, interrupted).await
}

/// [`wait_for`] with an arbitrary abort trigger.
pub async fn wait_for_until<A>(
    poller: &dyn OperationPoller,
    reference: &OperationRef,
    message: &str,
    config: &RetryConfig,
    progress: &mut ProgressTracker,
    abort: A,
) -> Result<serde_json::Value, WaitError>
where
    A: Future<Output = ()>,
{
    progress.start(message);

    let outcome = {
        let polling = async {
            let operation = poll_until_done(poller, reference, config, |op| progress.tick(op)).await?;
            poller.get_result(operation).await
        };

        tokio::select! {
            result = polling => result,
            _ = abort => Err(WaitError::Aborted {
                name: reference.relative_name(),
            }),
        }
    };

    progress.finish(outcome.is_ok());
    outcome
}
