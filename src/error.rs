//! Error types for Reprise

use std::io;
use thiserror::Error;

/// Result type for Reprise operations
pub type Result<T> = std::result::Result<T, RepriseError>;

/// Errors that can occur in Reprise
#[derive(Debug, Error)]
pub enum RepriseError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No cache entry exists for the key
    #[error("Cache entry not found: {0}")]
    EntryNotFound(String),

    /// The inner transport failed or its body could not be read
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response could not be constructed
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::http::Error),

    /// Unknown mode name
    #[error("Invalid mode: {0}")]
    InvalidMode(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
