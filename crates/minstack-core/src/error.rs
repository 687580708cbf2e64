//! Error types for the min-stack system
//!
//! This module defines all error types used throughout the crate.

use std::collections::TryReserveError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for min-stack operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the min-stack system
#[derive(Error, Debug)]
pub enum Error {
    /// No implementation anywhere satisfies the requested name
    #[error("implementation not found: {0}")]
    NotFound(String),

    /// Artifact located but could not be mapped into the process
    #[error("failed to load {}: {reason}", path.display())]
    LoadFailed {
        /// Artifact path that was attempted
        path: PathBuf,
        /// Loader diagnostic
        reason: String,
    },

    /// Artifact loaded but its descriptor is missing, malformed or mismatched
    #[error("invalid implementation ({origin}): {reason}")]
    InvalidImplementation {
        /// Where the descriptor came from (artifact path or source name)
        origin: String,
        /// What was wrong with it
        reason: String,
    },

    /// Allocation failure
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// `pop`/`min` called on a stack holding no elements
    #[error("stack is empty")]
    Empty,

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// The registry has already been torn down
    #[error("registry has been torn down")]
    ShutDown,
}

impl Error {
    /// Create a "not found" error
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a load failure for an artifact path
    pub fn load_failed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::LoadFailed {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an invalid implementation error
    pub fn invalid(origin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidImplementation {
            origin: origin.into(),
            reason: reason.into(),
        }
    }

    /// Create a resource exhaustion error
    pub fn exhausted(msg: impl Into<String>) -> Self {
        Self::ResourceExhausted(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// `true` for the `Empty` signal of `pop`/`min`
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl From<TryReserveError> for Error {
    fn from(err: TryReserveError) -> Self {
        Self::ResourceExhausted(err.to_string())
    }
}
