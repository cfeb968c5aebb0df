//! Error types for RenderHub configuration storage.
//!
//! A missing record is never an error: stores and repositories return
//! `Ok(None)` for it. Everything in [`StoreError`] is a genuine failure
//! that the caching layer propagates to its caller unchanged.
//!
//! # Example
//!
//! ```
//! use renderhub_core::{Result, StoreError};
//!
//! fn load(name: &str) -> Result<String> {
//!     if name.is_empty() {
//!         return Err(StoreError::invalid_name(name, "record name cannot be empty"));
//!     }
//!     Ok(format!("record {}", name))
//! }
//!
//! assert!(load("env-1").is_ok());
//! assert!(load("").is_err());
//! ```

use std::io;
use std::sync::Arc;

use thiserror::Error;

/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised by blob stores and configuration repositories.
///
/// The type is `Clone` so that a single failed load can be handed to every
/// caller that was waiting on the same cache entry.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The backing store cannot be reached.
    #[error("store unavailable: {reason}")]
    Unavailable {
        /// Description of what went wrong
        reason: String,
    },

    /// An I/O operation on a record failed.
    #[error("I/O error on '{name}': {source}")]
    Io {
        /// Record (or container) the operation was addressing
        name: String,
        /// Underlying I/O error
        #[source]
        source: Arc<io::Error>,
    },

    /// A record could not be encoded or decoded.
    #[error("failed to serialize record '{name}': {reason}")]
    Serialization {
        /// Record name
        name: String,
        /// Description of the codec failure
        reason: String,
    },

    /// A record name cannot be used as a storage key.
    #[error("invalid record name '{name}': {reason}")]
    InvalidName {
        /// The rejected name
        name: String,
        /// Why it was rejected
        reason: String,
    },

    /// The store did not answer in time.
    #[error("operation timed out after {seconds}s")]
    Timeout {
        /// Elapsed seconds before giving up
        seconds: u64,
    },
}

impl StoreError {
    /// Creates a new unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Wraps an I/O error for the given record.
    pub fn io(name: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            name: name.into(),
            source: Arc::new(source),
        }
    }

    /// Creates a new serialization error.
    pub fn serialization(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Serialization {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new invalid name error.
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if this is a transient error that might succeed on retry.
    ///
    /// Retrying is left to the caller; the caching layer never retries.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Unavailable { .. } | Self::Timeout { .. } => true,
            Self::Io { source, .. } => matches!(
                source.kind(),
                io::ErrorKind::Interrupted | io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
            ),
            Self::Serialization { .. } | Self::InvalidName { .. } => false,
        }
    }
}
