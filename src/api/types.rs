use serde::Deserialize;

use crate::operation::Operation;

pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// One page of `GET {parent}/operations`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOperationsResponse {
    #[serde(default)]
    pub operations: Vec<Operation>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl ListOperationsResponse {
    pub fn next_token(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Google API error envelope: `{"error": {...}}`.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl ErrorBody {
    pub fn describe(&self) -> String {
        match &self.status {
            Some(status) if !status.is_empty() => format!("{} [{}]", self.message, status),
            _ => self.message.clone(),
        }
    }
}

/// Extracts a readable message from an error response body, falling back to
/// the raw text.
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => envelope.error.describe(),
        _ => {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "Unknown error".to_string()
            } else {
                trimmed.to_string()
            }
        }
    }
}
