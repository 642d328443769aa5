//! Error types for the Zep Cloud client.

use thiserror::Error;

/// Errors raised by the upstream API or the client wrapping it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ZepError {
    /// No API key was configured.
    #[error("ZEP_API_KEY environment variable not set")]
    MissingApiKey,

    /// The resource being created already exists upstream.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// The requested resource does not exist upstream.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The API key was rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Any other non-success response.
    #[error("Zep API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The request did not complete within the configured deadline.
    #[error("Request to {0} timed out")]
    Timeout(String),

    /// Connection-level failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body did not match the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Rejected locally before any remote call.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ZepError {
    /// Whether this error reports a duplicate create.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, ZepError::AlreadyExists(_))
    }

    /// Map an HTTP status and body to the matching variant.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = extract_message(body);
        match status {
            409 => ZepError::AlreadyExists(message),
            400 if message.to_lowercase().contains("already exists") => {
                ZepError::AlreadyExists(message)
            }
            404 => ZepError::NotFound(message),
            401 | 403 => ZepError::Unauthorized(message),
            _ => ZepError::Api { status, message },
        }
    }
}

/// Pull the human-readable message out of an API error body.
fn extract_message(body: &str) -> String {
    let trimmed = body.trim();
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(msg) = value.get("message").and_then(|m| m.as_str()) {
            return msg.to_string();
        }
    }
    if trimmed.is_empty() {
        "no response body".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Convenience result alias.
pub type ZepResult<T> = Result<T, ZepError>;
