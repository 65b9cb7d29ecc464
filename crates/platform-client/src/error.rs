//! Error types for platform API calls

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while talking to the platform
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    // ============ Transport Errors ============
    #[error("transport error: {message}")]
    Transport { message: String },

    // ============ API Errors ============
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },

    #[error("failed to decode response body: {message}")]
    Decode { message: String },

    // ============ Request Errors ============
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// HTTP status of an API error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if this is a 404 Not Found from the platform
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Check if the request never produced an HTTP response
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport { .. })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Transport {
                message: format!("request timed out: {}", e),
            }
        } else if e.is_connect() {
            ClientError::Transport {
                message: format!("connection failed: {}", e),
            }
        } else if e.is_decode() {
            ClientError::Decode {
                message: e.to_string(),
            }
        } else if e.is_builder() {
            ClientError::InvalidRequest {
                message: e.to_string(),
            }
        } else {
            ClientError::Transport {
                message: e.to_string(),
            }
        }
    }
}

impl From<url::ParseError> for ClientError {
    fn from(e: url::ParseError) -> Self {
        ClientError::InvalidRequest {
            message: format!("invalid URL: {}", e),
        }
    }
}

/// Typed error document returned by the platform on 4xx/5xx
///
/// ```json
/// { "errors": [ { "code": "NOT_FOUND", "message": "Stage not found" } ] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

/// A single `{code, message}` pair
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl ErrorBody {
    /// Parse an error document, yielding an empty body for anything else
    pub fn parse(text: &str) -> Self {
        serde_json::from_str(text).unwrap_or_default()
    }

    /// True when no usable `{code, message}` pair was returned
    pub fn is_empty(&self) -> bool {
        self.errors
            .iter()
            .all(|e| e.code.trim().is_empty() && e.message.trim().is_empty())
    }

    /// Render every pair as one sentence, joined by single spaces
    pub fn joined(&self) -> String {
        self.errors
            .iter()
            .filter_map(ErrorDetail::sentence)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl ErrorDetail {
    fn sentence(&self) -> Option<String> {
        let code = self.code.trim();
        let message = self.message.trim().trim_end_matches('.');

        let text = match (code.is_empty(), message.is_empty()) {
            (true, true) => return None,
            (false, true) => code.to_string(),
            (true, false) => message.to_string(),
            (false, false) => format!("{} - {}", code, message),
        };

        Some(format!("{}.", text))
    }
}
