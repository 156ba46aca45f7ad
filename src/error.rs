// Error handling module
// Defines the error taxonomy surfaced by the API client and resource layer

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur while talking to the Little Lemon backend
#[derive(Error, Debug)]
pub enum ApiError {
    /// Backend answered with a non-success status
    #[error("API error: {status} - {body}")]
    Status { status: StatusCode, body: String },

    /// Network or transport failure before a response arrived
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Request descriptor could not be turned into an HTTP request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Input rejected before anything was sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// Role guard rejected the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Credential store could not be read or written
    #[error("Credential store error: {0}")]
    Store(String),
}

impl ApiError {
    /// HTTP status of the failed response, if there was one
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// True for a 401 response
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        ApiError::Store(err.to_string())
    }
}

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ApiError::Status {
            status: StatusCode::UNAUTHORIZED,
            body: "token expired".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 401 Unauthorized - token expired");

        let err = ApiError::Validation("quantity must be at least 1".to_string());
        assert_eq!(err.to_string(), "Validation error: quantity must be at least 1");

        let err = ApiError::Forbidden("manager role required".to_string());
        assert_eq!(err.to_string(), "Forbidden: manager role required");
    }

    #[test]
    fn test_is_unauthorized() {
        let err = ApiError::Status {
            status: StatusCode::UNAUTHORIZED,
            body: String::new(),
        };
        assert!(err.is_unauthorized());
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));

        let err = ApiError::Status {
            status: StatusCode::BAD_REQUEST,
            body: String::new(),
        };
        assert!(!err.is_unauthorized());

        let err = ApiError::Decode("missing field".to_string());
        assert!(!err.is_unauthorized());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_json_error_conversion() {
        let parse: std::result::Result<u32, _> = serde_json::from_str("\"nope\"");
        let err: ApiError = parse.unwrap_err().into();
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
