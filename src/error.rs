//! Error types for mirrormind.

use std::io;
use thiserror::Error;

/// Result type alias for mirrormind operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mirrormind operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Local storage I/O error.
    #[error("Storage error: {0}")]
    Storage(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The backend could not be reached.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("Backend returned {status}: {body}")]
    Backend {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// Invalid session state encountered.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// User text was empty or whitespace only.
    #[error("Message is empty")]
    EmptyInput,

    /// No user id was configured or supplied.
    #[error("No user id configured (set MIRRORMIND_USER_ID or pass --user)")]
    MissingUserId,

    /// User id cannot be used as a storage key.
    #[error("Invalid user id: {0}")]
    InvalidUserId(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}
