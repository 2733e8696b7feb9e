//! Turn-level failures.
//!
//! A `TurnError` ends one chat turn; it never ends the process or the session.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TurnError {
    /// Empty or whitespace-only submission. Rejected before any request.
    #[error("Please enter a message")]
    EmptyInput,

    /// The request did not finish within the configured ceiling.
    #[error("The AI agent server did not respond within {secs} seconds")]
    Timeout { secs: u64 },

    /// The API server could not be reached at all.
    #[error("Cannot connect to the AI agent server: {0}")]
    Connect(String),

    /// The API server answered with a non-success status.
    #[error("The AI agent server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The API server answered, but not with a reply we understand.
    #[error("Unexpected response from the AI agent server: {0}")]
    MalformedResponse(String),
}

impl TurnError {
    /// Whether the failure means the API server is not reachable.
    pub const fn is_connectivity(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Connect(_))
    }
}

// Timeouts are classified by the caller, which knows the ceiling.
impl From<reqwest::Error> for TurnError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            Self::Connect(err.to_string())
        } else {
            Self::MalformedResponse(err.to_string())
        }
    }
}
