//! Error types for the Lumino SDK

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Result type for Lumino operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for Lumino operations
#[derive(Debug, Error)]
pub enum Error {
    /// Connection failure, timeout, or an interrupted response body
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API key was rejected (401) or lacks permission (403)
    #[error("Authentication error ({status_code}): {message}")]
    Authentication {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },

    /// The requested resource does not exist
    #[error("Not found: {message}")]
    NotFound {
        /// Error message
        message: String,
    },

    /// The request was rejected as invalid, either by the server (400, 422)
    /// or by a local check before anything was sent
    #[error("Validation error: {message}")]
    Validation {
        /// HTTP status code, `None` when the check ran locally
        status_code: Option<u16>,
        /// Error message
        message: String,
        /// Offending field, if known
        field: Option<String>,
        /// Field-level detail supplied by the server
        details: Option<Value>,
    },

    /// The server failed to handle the request (5xx)
    #[error("Server error ({status_code}): {message}")]
    Server {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },

    /// Any other non-success response
    #[error("API error: {status_code} - {message}")]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
        /// Additional detail supplied by the server
        details: Option<Value>,
    },

    /// A success response whose body did not have the expected shape
    #[error("Unknown response format: {0}")]
    UnknownResponse(String),

    /// Client configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local file error while uploading or downloading a dataset
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build the error for a non-success response from its status and raw body
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let (message, details) = parse_error_body(body, status);
        let status_code = status.as_u16();

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Authentication {
                status_code,
                message,
            },
            StatusCode::NOT_FOUND => Error::NotFound { message },
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Error::Validation {
                status_code: Some(status_code),
                message,
                field: None,
                details,
            },
            s if s.is_server_error() => Error::Server {
                status_code,
                message,
            },
            _ => Error::Api {
                status_code,
                message,
                details,
            },
        }
    }

    /// Local validation failure for a single field
    pub(crate) fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        Error::Validation {
            status_code: None,
            message: message.into(),
            field: Some(field.to_string()),
            details: None,
        }
    }

    /// HTTP status code carried by this error, if it came from a response
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Authentication { status_code, .. }
            | Error::Server { status_code, .. }
            | Error::Api { status_code, .. } => Some(*status_code),
            Error::NotFound { .. } => Some(StatusCode::NOT_FOUND.as_u16()),
            Error::Validation { status_code, .. } => *status_code,
            Error::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Pull `message` and `details` out of an error body.
///
/// JSON objects may carry either `message`/`details` or a single `detail`,
/// which is the message when it is a string and the details otherwise.
fn parse_error_body(body: &str, status: StatusCode) -> (String, Option<Value>) {
    let fallback = || {
        if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        } else {
            body.to_string()
        }
    };

    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) else {
        return (fallback(), None);
    };

    let detail = map.get("detail");
    let message = map
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| detail.and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string());

    let details = map
        .get("details")
        .cloned()
        .or_else(|| detail.filter(|d| !d.is_string()).cloned())
        .filter(|d| !d.is_null());

    (message, details)
}
