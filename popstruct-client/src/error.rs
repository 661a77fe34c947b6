//! Error types for the PopStruct client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the PopStruct client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Session is missing or could not be refreshed
    #[error("Authentication expired: {0}")]
    AuthExpired(String),

    /// Results have not been produced yet
    #[error("Not available yet: {0}")]
    NotReady(String),

    /// Session storage failed
    #[error("Session storage error: {0}")]
    Session(String),
}

/// Coarse classification used to decide how an error is surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Access could not be restored; the user has to log in again
    AuthExpired,
    /// The request was rejected; the message belongs next to the input
    Validation,
    /// The job or dataset does not exist
    NotFound,
    /// Network or server trouble; a manual retry may succeed
    Transient,
    /// Artifacts are not produced yet
    ResourceNotReady,
    /// Anything the client cannot interpret
    Unexpected,
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Create an API error from a raw response body
    ///
    /// FastAPI wraps messages as `{"detail": ...}`; the detail is unwrapped
    /// when present.
    pub fn from_body(status: u16, body: &str) -> Self {
        Self::api_error(status, extract_detail(body))
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RequestFailed(e) if e.is_decode() => ErrorKind::Unexpected,
            Self::RequestFailed(_) => ErrorKind::Transient,
            Self::ApiError { status, .. } => match *status {
                401 => ErrorKind::AuthExpired,
                404 => ErrorKind::NotFound,
                408 | 429 => ErrorKind::Transient,
                400..=499 => ErrorKind::Validation,
                _ => ErrorKind::Transient,
            },
            Self::ParseError(_) | Self::Session(_) => ErrorKind::Unexpected,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidRequest(_) => ErrorKind::Validation,
            Self::AuthExpired(_) => ErrorKind::AuthExpired,
            Self::NotReady(_) => ErrorKind::ResourceNotReady,
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 400 && *status < 500)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }

    /// Message suitable for showing to a user
    pub fn user_message(&self) -> String {
        match self {
            Self::ApiError { message, .. } if self.kind() == ErrorKind::Validation => {
                message.clone()
            }
            Self::InvalidRequest(message) => message.clone(),
            _ => match self.kind() {
                ErrorKind::AuthExpired => {
                    "Your session has expired. Please log in again.".to_string()
                }
                ErrorKind::NotFound => "Not found.".to_string(),
                ErrorKind::Transient => {
                    "Could not reach the server. Please try again.".to_string()
                }
                ErrorKind::ResourceNotReady => {
                    "Results are not available yet. Try again once the job has completed."
                        .to_string()
                }
                ErrorKind::Validation | ErrorKind::Unexpected => self.to_string(),
            },
        }
    }

    /// Reclassify "not completed"/"no results" responses from result endpoints
    ///
    /// The backend answers 400 while the job runs and 404 when no artifact
    /// exists; only a missing job stays a 404.
    pub(crate) fn into_not_ready(self) -> Self {
        match self {
            Self::ApiError { status: 404, message } if message == "Job not found" => {
                Self::NotFound(message)
            }
            Self::ApiError {
                status: 400 | 404,
                message,
            } => Self::NotReady(message),
            other => other,
        }
    }
}

/// Unwraps the `detail` field of a FastAPI error body
fn extract_detail(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return if body.trim().is_empty() {
            "Unknown error".to_string()
        } else {
            body.trim().to_string()
        };
    };

    match value.get("detail") {
        Some(serde_json::Value::String(detail)) => detail.clone(),
        // Request validation errors: [{"loc": [...], "msg": "...", ...}]
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
            .collect::<Vec<_>>()
            .join("; "),
        Some(other) => other.to_string(),
        None => body.trim().to_string(),
    }
}
