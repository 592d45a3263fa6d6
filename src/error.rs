//! Error types for gateway-agent
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur while driving the agent
#[derive(Debug, Error)]
pub enum AgentError {
    /// The responder rejected the request as malformed (HTTP 400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Any other non-success status from the hosted API
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// No usable credential could be acquired
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Configuration could not be loaded or is invalid
    #[error("Config error: {0}")]
    Config(String),

    /// The response body did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Transport-level failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AgentError {
    /// The only error kind the session recovers from
    pub fn is_bad_request(&self) -> bool {
        matches!(self, AgentError::BadRequest(_))
    }
}

/// Result type alias for gateway-agent operations
pub type Result<T> = std::result::Result<T, AgentError>;
