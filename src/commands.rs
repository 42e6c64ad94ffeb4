//! Command drivers: each turns one CLI invocation into a short sequence of
//! REST calls and, where an operation is involved, an optional wait.

use std::time::Duration;

use reqwest::Method;

use crate::api::OperationsClient;
use crate::config::Config;
use crate::error::OpwaitError;
use crate::operation::Operation;
use crate::reference::{OperationRef, ParentDefaults};
use crate::waiter::{self, ProgressTracker, ResultMode};

/// Everything a command needs, built once per invocation.
#[derive(Debug, Clone)]
pub struct Session {
    pub client: OperationsClient,
    pub config: Config,
    pub defaults: ParentDefaults,
}

/// What a command hands back for printing.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutput {
    Operation(Operation),
    Operations(Vec<Operation>),
    Value(serde_json::Value),
    None,
}

#[derive(Debug, Clone)]
pub struct CallRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
    pub run_async: bool,
    pub result_mode: Option<ResultMode>,
    pub timeout: Option<Duration>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ListRequest {
    pub parent: Option<String>,
    pub filter: Option<String>,
    pub page_size: Option<u32>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct WaitRequest {
    pub operation: String,
    pub result_mode: ResultMode,
    pub timeout: Option<Duration>,
    pub message: Option<String>,
}

impl Session {
    pub fn new(client: OperationsClient, config: Config, defaults: ParentDefaults) -> Self {
        Self {
            client,
            config,
            defaults,
        }
    }

    fn resolve(&self, operation: &str) -> Result<OperationRef, OpwaitError> {
        Ok(OperationRef::resolve(operation, &self.defaults)?)
    }
}

/// Mutating verbs accepted by `call`.
pub fn validate_method(method: &Method) -> Result<(), OpwaitError> {
    match *method {
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE => Ok(()),
        ref other => Err(OpwaitError::InvalidArgument(format!(
            "method must be one of POST, PUT, PATCH or DELETE, got {}",
            other
        ))),
    }
}

/// Parses `--data`: inline JSON, or `@path` to read it from a file.
pub fn parse_data(raw: &str) -> Result<serde_json::Value, OpwaitError> {
    let text = match raw.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)?,
        None => raw.to_string(),
    };

    let value: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| OpwaitError::InvalidArgument(format!("--data is not valid JSON: {}", e)))?;

    if !value.is_object() {
        return Err(OpwaitError::InvalidArgument(
            "--data must be a JSON object".to_string(),
        ));
    }
    Ok(value)
}

fn validate_timeout(timeout: Option<Duration>) -> Result<(), OpwaitError> {
    match timeout {
        Some(t) if t.is_zero() => Err(OpwaitError::InvalidArgument(
            "--timeout must be greater than zero".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Sends a mutating request and, unless `run_async`, waits for the
/// resulting operation.
pub async fn call(
    session: &Session,
    request: CallRequest,
    progress: &mut ProgressTracker,
) -> Result<CommandOutput, OpwaitError> {
    validate_method(&request.method)?;
    validate_timeout(request.timeout)?;
    let path = request.path.trim();
    if path.is_empty() {
        return Err(OpwaitError::InvalidArgument(
            "request path must not be empty".to_string(),
        ));
    }
    if let Some(body) = &request.body {
        if !body.is_object() {
            return Err(OpwaitError::InvalidArgument(
                "request body must be a JSON object".to_string(),
            ));
        }
    }
    let retry = session.config.retry_config(request.timeout)?;

    let operation = session
        .client
        .send(request.method.clone(), path, request.body.as_ref())
        .await?;

    progress.status(&format!("Request issued for: [{}]", path));

    if request.run_async {
        progress.status(&format!("Check operation [{}] for status.", operation.name));
        return Ok(CommandOutput::Operation(operation));
    }

    let reference = match session.resolve(&operation.name) {
        Ok(reference) => reference,
        Err(e) => {
            progress.status(&format!("Check operation [{}] for status.", operation.name));
            return Err(e);
        }
    };
    let mode = request.result_mode.unwrap_or(if request.method == Method::DELETE {
        ResultMode::Response
    } else {
        ResultMode::Resource
    });
    let poller = waiter::get_poller(mode, session.client.clone());
    let message = request
        .message
        .unwrap_or_else(|| format!("Waiting for operation [{}] to complete", reference));

    let result = waiter::wait_for(poller.as_ref(), &reference, &message, &retry, progress).await?;

    progress.status(&format!("Finished operation [{}].", reference));
    Ok(CommandOutput::Value(result))
}

pub async fn describe(session: &Session, operation: &str) -> Result<CommandOutput, OpwaitError> {
    let reference = session.resolve(operation)?;
    let op = session.client.get_operation(&reference.relative_name()).await?;
    Ok(CommandOutput::Operation(op))
}

pub async fn list(session: &Session, request: ListRequest) -> Result<CommandOutput, OpwaitError> {
    if request.page_size == Some(0) {
        return Err(OpwaitError::InvalidArgument(
            "--page-size must be greater than zero".to_string(),
        ));
    }

    let parent = match request.parent {
        Some(parent) => parent,
        None => {
            let project = session.defaults.project.as_deref().ok_or_else(|| {
                OpwaitError::InvalidArgument(
                    "--parent or --project is required to list operations".to_string(),
                )
            })?;
            let location = session.defaults.location.as_deref().unwrap_or("global");
            format!("projects/{}/locations/{}", project, location)
        }
    };

    let ops = session
        .client
        .list_operations(
            &parent,
            request.filter.as_deref(),
            request.page_size,
            request.limit,
        )
        .await?;
    Ok(CommandOutput::Operations(ops))
}

pub async fn wait(
    session: &Session,
    request: WaitRequest,
    progress: &mut ProgressTracker,
) -> Result<CommandOutput, OpwaitError> {
    validate_timeout(request.timeout)?;
    let reference = session.resolve(&request.operation)?;
    let retry = session.config.retry_config(request.timeout)?;

    let poller = waiter::get_poller(request.result_mode, session.client.clone());
    let message = request
        .message
        .unwrap_or_else(|| format!("Waiting for operation [{}] to complete", reference));

    let result = waiter::wait_for(poller.as_ref(), &reference, &message, &retry, progress).await?;
    Ok(CommandOutput::Value(result))
}

pub async fn cancel(
    session: &Session,
    operation: &str,
    progress: &mut ProgressTracker,
) -> Result<CommandOutput, OpwaitError> {
    let reference = session.resolve(operation)?;
    session
        .client
        .cancel_operation(&reference.relative_name())
        .await?;
    progress.status(&format!("Cancellation requested for operation [{}].", reference));
    Ok(CommandOutput::None)
}

pub async fn delete(
    session: &Session,
    operation: &str,
    progress: &mut ProgressTracker,
) -> Result<CommandOutput, OpwaitError> {
    let reference = session.resolve(operation)?;
    session
        .client
        .delete_operation(&reference.relative_name())
        .await?;
    progress.status(&format!("Deleted operation [{}].", reference));
    Ok(CommandOutput::None)
}
