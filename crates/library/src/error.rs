//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Errors from the ledger, extract and
//! telegram crates are attached as children of these.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A directory (or an entry in it) couldn't be read while walking.
    #[display("cannot walk {}", _0.display())]
    Walk(#[error(not(source))] PathBuf),
    /// A ledger couldn't be updated.
    #[display("cannot update ledger {_0}")]
    Ledger(#[error(not(source))] String),
    /// A file's tags couldn't be read for a reason other than bad tag data.
    #[display("cannot read {}", _0.display())]
    Extract(#[error(not(source))] PathBuf),
    /// The chat platform refused a request, or couldn't be reached.
    #[display("chat request failed: {_0}")]
    Chat(#[error(not(source))] &'static str),
    /// An output file couldn't be written.
    #[display("cannot write {}", _0.display())]
    Write(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Walk(_) | Self::Write(_))
    }
}
