//! Error types for the B-tree.

use thiserror::Error;

/// Result type alias for B-tree operations
pub type Result<T> = std::result::Result<T, BTreeError>;

/// Errors that can occur while building or checking a B-tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BTreeError {
    /// Minimum degree below the smallest legal value
    #[error("Invalid minimum degree {degree} (must be at least {min})")]
    InvalidDegree { degree: usize, min: usize },

    /// A structural invariant does not hold (only produced by validation)
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

impl BTreeError {
    /// Create an invariant violation error with a message
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }
}
