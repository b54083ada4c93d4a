//! Telegram Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A chat client error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for chat client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The platform is rate limiting this client. Wait `retry_after` seconds,
    /// then try the exact same request again.
    #[display("rate limited: retry after {retry_after} seconds")]
    RateLimited { retry_after: u64 },
    /// The request never got an answer (DNS, TLS, connection reset, ...).
    #[display("network error calling {_0}")]
    Network(#[error(not(source))] &'static str),
    /// The platform answered, and the answer was "no".
    #[display("{method} failed ({code}): {description}")]
    Api {
        method: &'static str,
        code: i64,
        description: String,
    },
    /// The platform answered with something that isn't a valid API response.
    #[display("invalid response from {_0}")]
    InvalidResponse(#[error(not(source))] &'static str),
    /// A local file to be uploaded could not be read.
    #[display("cannot read upload: {}", _0.display())]
    Io(#[error(not(source))] PathBuf),
    /// The client could not be constructed.
    #[display("invalid client configuration")]
    Config,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Network(_))
    }

    /// The server-mandated wait, if this is a rate-limit signal.
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}
