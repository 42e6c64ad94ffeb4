use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::ApiError;
use super::types::{DEFAULT_PAGE_SIZE, ListOperationsResponse, error_message};
use crate::operation::Operation;

#[derive(Clone)]
pub struct OperationsClient {
    client: reqwest::Client,
    base_url: String,
}

impl OperationsClient {
    /// `endpoint` is the versioned service root, e.g.
    /// `https://workstations.googleapis.com/v1`.
    pub fn new(token: String, endpoint: String) -> Result<Self, ApiError> {
        Self::with_base_url(token, endpoint)
    }

    /// NOTE: Primarily used for testing with mock servers.
    pub fn with_base_url(token: String, base_url: String) -> Result<Self, ApiError> {
        Self::create_client(token, base_url)
    }

    fn create_client(token: String, base_url: String) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        let mut header_value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ApiError::InvalidToken)?;
        header_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, header_value);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("opwait/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Network)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get_operation(&self, name: &str) -> Result<Operation, ApiError> {
        let url = self.url(name);
        tracing::debug!(operation = %name, "fetching operation");

        let response = self.client.get(&url).send().await?;
        read_json(response, &url, name).await
    }

    /// Fetches an arbitrary resource, typically the one an operation produced.
    pub async fn get_resource(&self, name: &str) -> Result<serde_json::Value, ApiError> {
        let url = self.url(name);
        tracing::debug!(resource = %name, "fetching resource");

        let response = self.client.get(&url).send().await?;
        read_json(response, &url, name).await
    }

    pub async fn cancel_operation(&self, name: &str) -> Result<(), ApiError> {
        let url = format!("{}:cancel", self.url(name));

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        read_json::<serde_json::Value>(response, &url, name).await?;

        tracing::info!(operation = %name, "cancellation requested");
        Ok(())
    }

    pub async fn delete_operation(&self, name: &str) -> Result<(), ApiError> {
        let url = self.url(name);

        let response = self.client.delete(&url).send().await?;
        read_json::<serde_json::Value>(response, &url, name).await?;

        tracing::info!(operation = %name, "operation deleted");
        Ok(())
    }

    /// Issues a mutating request whose response is an operation handle.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<Operation, ApiError> {
        let url = self.url(path);
        tracing::debug!(method = %method, path = %path, "issuing request");

        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let operation: Operation = read_json(response, &url, path).await?;

        if operation.name.is_empty() {
            return Err(ApiError::InvalidResponse {
                url,
                message: "response is not an operation (missing 'name')".to_string(),
            });
        }

        Ok(operation)
    }

    /// Lists operations under `parent`, following `nextPageToken` until the
    /// listing is exhausted or `limit` operations were collected.
    pub async fn list_operations(
        &self,
        parent: &str,
        filter: Option<&str>,
        page_size: Option<u32>,
        limit: Option<usize>,
    ) -> Result<Vec<Operation>, ApiError> {
        let base = self.url(&format!("{}/operations", parent.trim_end_matches('/')));
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);

        if limit == Some(0) {
            return Ok(Vec::new());
        }

        let mut all_results = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = format!("{}?pageSize={}", base, page_size);
            if let Some(filter) = filter {
                url.push_str(&format!("&filter={}", urlencoding::encode(filter)));
            }
            if let Some(token) = &page_token {
                url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
            }

            let response = self.client.get(&url).send().await?;
            let page: ListOperationsResponse = read_json(response, &url, parent).await?;

            let next = page.next_token().map(str::to_string);
            all_results.extend(page.operations);

            if let Some(limit) = limit {
                if all_results.len() >= limit {
                    all_results.truncate(limit);
                    break;
                }
            }

            match next {
                Some(token) if page_token.as_deref() == Some(token.as_str()) => {
                    tracing::warn!(parent = %parent, token = %token, "page token repeated, stopping");
                    break;
                }
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::debug!(count = all_results.len(), parent = %parent, "operations listed");
        Ok(all_results)
    }
}

async fn read_json<T: DeserializeOwned>(
    response: Response,
    url: &str,
    name: &str,
) -> Result<T, ApiError> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(status_error(status, name, &text));
    }

    // NOTE: DELETE and :cancel may answer with an empty body
    let text = if text.trim().is_empty() { "{}" } else { text.as_str() };

    serde_json::from_str(text).map_err(|e| ApiError::InvalidResponse {
        url: url.to_string(),
        message: format!("Failed to parse response: {}", e),
    })
}

fn status_error(status: StatusCode, name: &str, body: &str) -> ApiError {
    let message = error_message(body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Auth {
            status: status.as_u16(),
            message,
        },
        StatusCode::NOT_FOUND => ApiError::NotFound {
            name: name.to_string(),
            message,
        },
        _ => ApiError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

impl std::fmt::Debug for OperationsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationsClient")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = OperationsClient::new(
            "test_token".to_string(),
            "https://example.googleapis.com/v1".to_string(),
        );
        assert!(client.is_ok());
    }

    #[test]
    fn test_invalid_token_rejected() {
        let result = OperationsClient::new(
            "bad\ntoken".to_string(),
            "https://example.googleapis.com/v1".to_string(),
        );
        assert!(matches!(result, Err(ApiError::InvalidToken)));
    }

    #[test]
    fn test_debug_does_not_expose_token() {
        let client = OperationsClient::new(
            "ya29.super_secret_token_12345".to_string(),
            "https://example.googleapis.com/v1".to_string(),
        )
        .unwrap();
        let debug_output = format!("{:?}", client);

        assert!(
            debug_output.contains("[REDACTED]"),
            "Debug output should contain [REDACTED]"
        );
        assert!(
            !debug_output.contains("super_secret_token_12345"),
            "Debug output must NOT contain the actual token"
        );
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = OperationsClient::new(
            "t".to_string(),
            "https://example.googleapis.com/v1/".to_string(),
        )
        .unwrap();
        assert_eq!(client.api_base(), "https://example.googleapis.com/v1");
        assert_eq!(
            client.url("/projects/p/operations/o"),
            "https://example.googleapis.com/v1/projects/p/operations/o"
        );
    }

    #[test]
    fn test_status_error_mapping() {
        let body = r#"{"error": {"code": 403, "message": "denied", "status": "PERMISSION_DENIED"}}"#;
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, "n", body),
            ApiError::Auth { status: 403, .. }
        ));
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, "n", body),
            ApiError::NotFound { .. }
        ));
        assert!(matches!(
            status_error(StatusCode::SERVICE_UNAVAILABLE, "n", body),
            ApiError::Api { status: 503, .. }
        ));
    }
}
