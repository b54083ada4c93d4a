//! Ledger Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A ledger error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for ledger operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The backing store could not be read from or written to.
    #[display("ledger I/O error: {_0}")]
    Io(#[error(not(source))] String),
    /// The backing store contains data that isn't a valid ledger. Don't retry;
    /// the file needs fixing by hand.
    #[display("invalid ledger data: {_0}")]
    InvalidData(#[error(not(source))] String),
    /// The in-memory ledger could not be serialized.
    #[display("ledger serialization error")]
    Serialize,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
