//! Error types for collection operations
//!
//! Lookup misses (`get`, `first`, `last`) are surfaced as `Option` rather
//! than errors so they stay usable in control flow; only genuine contract
//! violations reach this taxonomy.

use thiserror::Error;

/// Result type alias for collection operations
pub type Result<T> = std::result::Result<T, CollectionError>;

/// Error type for collection operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    /// Operation requires at least one element
    #[error("collection is empty")]
    EmptyCollection,

    /// Caller supplied an argument outside the operator's domain
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Human-readable description of the rejected argument
        message: String,
    },

    /// Element shape does not match what the operator requires
    #[error("type error: {message}")]
    TypeError {
        /// Human-readable description of the mismatch
        message: String,
    },
}

impl CollectionError {
    /// Create an `InvalidArgument` error from any displayable message
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a `TypeError` from any displayable message
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::TypeError {
            message: message.into(),
        }
    }
}
