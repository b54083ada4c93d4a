//! Application Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

/// An application error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for the binaries.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("cannot set up logging")]
    Logging,
    #[display("cannot open ledger {}", _0.display())]
    Ledger(#[error(not(source))] PathBuf),
    #[display("cannot connect to the chat platform")]
    Chat,
    #[display("cannot walk library {}", _0.display())]
    Library(#[error(not(source))] PathBuf),
    #[display("upload run failed")]
    Upload,
    #[display("cannot export metadata")]
    Export,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// Always `false`: rate limits are retried inside the run, so whatever
    /// reaches the binaries has already ended it.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_nothing_is_retryable() {
        let kinds = [
            ErrorKind::Logging,
            ErrorKind::Ledger(PathBuf::from("data/processed-tracks.json")),
            ErrorKind::Chat,
            ErrorKind::Library(PathBuf::from("/music")),
            ErrorKind::Upload,
            ErrorKind::Export,
        ];
        assert!(kinds.iter().all(|kind| !kind.is_retryable()));
    }
}
