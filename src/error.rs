use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpwaitError {
    #[error("authentication required: {0}")]
    Auth(String),

    #[error(transparent)]
    Api(#[from] crate::api::ApiError),

    #[error(transparent)]
    Wait(#[from] crate::waiter::WaitError),

    #[error(transparent)]
    Reference(#[from] crate::reference::ReferenceError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_auth_error_display() {
        let err = OpwaitError::Auth("no access token".to_string());
        assert_eq!(err.to_string(), "authentication required: no access token");
    }

    #[test]
    fn test_config_error_display() {
        let err = OpwaitError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "configuration error: missing field");
    }

    #[test]
    fn test_invalid_argument_display() {
        let err = OpwaitError::InvalidArgument("--timeout must be positive".to_string());
        assert_eq!(err.to_string(), "invalid argument: --timeout must be positive");
    }

    #[test]
    fn test_io_error_from_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: OpwaitError = io_err.into();
        assert!(matches!(err, OpwaitError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_reference_error_from_conversion() {
        let ref_err = crate::reference::ReferenceError::Empty;
        let err: OpwaitError = ref_err.into();
        assert!(matches!(err, OpwaitError::Reference(_)));
        assert_eq!(err.to_string(), "operation reference is empty");
    }

    #[test]
    fn test_wait_error_from_conversion() {
        let wait_err = crate::waiter::WaitError::Aborted {
            name: "operations/o".to_string(),
        };
        let err: OpwaitError = wait_err.into();
        assert!(matches!(err, OpwaitError::Wait(_)));
        assert!(err.to_string().contains("Aborting wait"));
    }
}
