//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation. Capability
//! handlers never surface these to their caller directly; they are rendered
//! into text by the exporter. Storage errors are the one class the prober
//! lets propagate.

use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the tool registry.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid tool configuration (bad HTTP verb, bad header name, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// Unknown tool id.
    #[error("not found: {0}")]
    NotFound(String),

    /// DNS, connect, or timeout failure. Never retried.
    #[error("network error: {0}")]
    Network(String),

    /// Remote endpoint answered with a non-success status.
    #[error("HTTP status {status}: {message}")]
    HttpStatus { status: u16, message: String },

    /// Response body is not valid JSON.
    #[error("decode error: {0}")]
    Decode(String),

    /// Tool record store failures.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal errors (poisoned locks and the like).
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for failures caused by the remote side or the network, as
    /// opposed to local misconfiguration or storage problems.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Error::Network(_) | Error::HttpStatus { .. } | Error::Decode(_)
        )
    }
}

// Convenience constructors
impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn http_status(status: u16, msg: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            message: msg.into(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            return Error::Validation(format!("invalid request: {}", err));
        }
        if err.is_decode() {
            return Error::Decode(err.to_string());
        }
        if err.is_timeout() {
            return Error::Network(format!("request timed out: {}", err));
        }
        Error::Network(err.to_string())
    }
}
