use serde::{Deserialize, Serialize};

/// A server-side long-running operation handle.
///
/// Once `done` is true, exactly one of `error` or `response` is populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<serde_json::Value>,
}

/// Server-reported failure details (google.rpc.Status).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<serde_json::Value>,
}

impl Operation {
    pub fn is_failed(&self) -> bool {
        self.done && self.error.is_some()
    }

    /// Short label used by table output.
    pub fn state_label(&self) -> &'static str {
        if !self.done {
            "RUNNING"
        } else if self.is_failed() {
            "FAILED"
        } else {
            "SUCCEEDED"
        }
    }

    /// Name of the resource carried in `response`, if the service embeds one.
    pub fn response_resource_name(&self) -> Option<&str> {
        self.response
            .as_ref()
            .and_then(|r| r.get("name"))
            .and_then(|n| n.as_str())
            .filter(|n| !n.is_empty())
    }
}

impl Status {
    /// Canonical name of the numeric google.rpc code.
    pub fn code_name(&self) -> &'static str {
        match self.code {
            0 => "OK",
            1 => "CANCELLED",
            2 => "UNKNOWN",
            3 => "INVALID_ARGUMENT",
            4 => "DEADLINE_EXCEEDED",
            5 => "NOT_FOUND",
            6 => "ALREADY_EXISTS",
            7 => "PERMISSION_DENIED",
            8 => "RESOURCE_EXHAUSTED",
            9 => "FAILED_PRECONDITION",
            10 => "ABORTED",
            11 => "OUT_OF_RANGE",
            12 => "UNIMPLEMENTED",
            13 => "INTERNAL",
            14 => "UNAVAILABLE",
            15 => "DATA_LOSS",
            16 => "UNAUTHENTICATED",
            _ => "UNKNOWN",
        }
    }
}
