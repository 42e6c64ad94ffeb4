use async_trait::async_trait;

use super::{OperationPoller, WaitError};
use crate::api::OperationsClient;
use crate::operation::Operation;
use crate::reference::OperationRef;

/// Polls the operations endpoint and, once done, fetches the resource the
/// operation produced (named by `response.name`).
#[derive(Debug, Clone)]
pub struct CloudOperationPoller {
    client: OperationsClient,
}

impl CloudOperationPoller {
    pub fn new(client: OperationsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OperationPoller for CloudOperationPoller {
    fn name(&self) -> &str {
        "cloud-operation"
    }

    async fn poll(&self, reference: &OperationRef) -> Result<Operation, WaitError> {
        Ok(self.client.get_operation(&reference.relative_name()).await?)
    }

    fn is_done(&self, operation: &Operation) -> Result<bool, WaitError> {
        check_done(operation)
    }

    async fn get_result(&self, operation: Operation) -> Result<serde_json::Value, WaitError> {
        let resource = operation
            .response_resource_name()
            .ok_or_else(|| WaitError::MissingResult {
                name: operation.name.clone(),
            })?;
        Ok(self.client.get_resource(resource).await?)
    }
}

/// Like [`CloudOperationPoller`], but returns the embedded `response` payload
/// instead of fetching a resource. Used for deletes and APIs whose result is
/// not a standalone resource.
#[derive(Debug, Clone)]
pub struct CloudOperationPollerNoResources {
    client: OperationsClient,
}

impl CloudOperationPollerNoResources {
    pub fn new(client: OperationsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OperationPoller for CloudOperationPollerNoResources {
    fn name(&self) -> &str {
        "cloud-operation-no-resources"
    }

    async fn poll(&self, reference: &OperationRef) -> Result<Operation, WaitError> {
        Ok(self.client.get_operation(&reference.relative_name()).await?)
    }

    fn is_done(&self, operation: &Operation) -> Result<bool, WaitError> {
        check_done(operation)
    }

    async fn get_result(&self, operation: Operation) -> Result<serde_json::Value, WaitError> {
        Ok(operation.response.unwrap_or(serde_json::Value::Null))
    }
}

/// A terminal operation carrying an error is reported as a failure.
pub fn check_done(operation: &Operation) -> Result<bool, WaitError> {
    if !operation.done {
        return Ok(false);
    }
    match &operation.error {
        Some(status) => Err(WaitError::Operation {
            name: operation.name.clone(),
            status: status.clone(),
        }),
        None => Ok(true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::Status;

    fn client() -> OperationsClient {
        OperationsClient::new("t".to_string(), "http://localhost:1/v1".to_string()).unwrap()
    }

    #[test]
    fn test_check_done_running() {
        let op = Operation {
            name: "operations/o".to_string(),
            ..Default::default()
        };
        assert!(!check_done(&op).unwrap());
    }

    #[test]
    fn test_check_done_success() {
        let op = Operation {
            name: "operations/o".to_string(),
            done: true,
            response: Some(serde_json::json!({})),
            ..Default::default()
        };
        assert!(check_done(&op).unwrap());
    }

    #[test]
    fn test_check_done_failure_carries_status() {
        let op = Operation {
            name: "operations/o".to_string(),
            done: true,
            error: Some(Status {
                code: 3,
                message: "bad machine type".to_string(),
                details: vec![],
            }),
            ..Default::default()
        };
        match check_done(&op) {
            Err(WaitError::Operation { name, status }) => {
                assert_eq!(name, "operations/o");
                assert_eq!(status.code, 3);
                assert_eq!(status.message, "bad machine type");
            }
            other => panic!("expected WaitError::Operation, got {:?}", other),
        }
    }

    #[test]
    fn test_error_ignored_while_running() {
        let op = Operation {
            name: "operations/o".to_string(),
            done: false,
            error: Some(Status::default()),
            ..Default::default()
        };
        assert!(!check_done(&op).unwrap());
    }

    #[tokio::test]
    async fn test_no_resources_returns_embedded_response() {
        let poller = CloudOperationPollerNoResources::new(client());
        let op = Operation {
            name: "operations/o".to_string(),
            done: true,
            response: Some(serde_json::json!({"@type": "google.protobuf.Empty"})),
            ..Default::default()
        };
        let result = poller.get_result(op).await.unwrap();
        assert_eq!(result["@type"], "google.protobuf.Empty");
    }

    #[tokio::test]
    async fn test_no_resources_missing_response_is_null() {
        let poller = CloudOperationPollerNoResources::new(client());
        let op = Operation {
            name: "operations/o".to_string(),
            done: true,
            ..Default::default()
        };
        assert!(poller.get_result(op).await.unwrap().is_null());
    }

    #[tokio::test]
    async fn test_resource_poller_requires_response_name() {
        let poller = CloudOperationPoller::new(client());
        let op = Operation {
            name: "operations/o".to_string(),
            done: true,
            response: Some(serde_json::json!({})),
            ..Default::default()
        };
        let err = poller.get_result(op).await.unwrap_err();
        assert!(matches!(err, WaitError::MissingResult { .. }));
    }

    #[test]
    fn test_poller_names() {
        assert_eq!(CloudOperationPoller::new(client()).name(), "cloud-operation");
        assert_eq!(
            CloudOperationPollerNoResources::new(client()).name(),
            "cloud-operation-no-resources"
        );
    }
}
