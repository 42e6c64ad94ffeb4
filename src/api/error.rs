use thiserror::Error;

/// Errors raised by the REST operations client.
///
/// SECURITY: Error messages must NEVER contain the access token.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Authentication or authorization failed (HTTP 401/403)
    #[error("authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },

    /// Requested resource does not exist (HTTP 404)
    #[error("resource not found: '{name}': {message}")]
    NotFound { name: String, message: String },

    /// Any other non-success HTTP status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Network-level error (connection failed, timeout, etc.)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Body could not be decoded into the expected shape
    #[error("invalid response from {url}: {message}")]
    InvalidResponse { url: String, message: String },

    /// Token contains characters not allowed in an HTTP header
    #[error("access token is not a valid header value")]
    InvalidToken,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_display() {
        let err = ApiError::Auth {
            status: 401,
            message: "Request had invalid authentication credentials.".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "authentication failed (401): Request had invalid authentication credentials."
        );
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Api {
            status: 400,
            message: "Invalid value for field 'pageSize'".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API error (400): Invalid value for field 'pageSize'"
        );
    }

    #[test]
    fn test_not_found_display() {
        let err = ApiError::NotFound {
            name: "projects/p/operations/op".to_string(),
            message: "Operation not found".to_string(),
        };
        assert!(err.to_string().contains("'projects/p/operations/op'"));
    }

    #[test]
    fn test_invalid_token_does_not_echo_value() {
        let err = ApiError::InvalidToken;
        assert!(!err.to_string().contains("ya29"));
    }
}
