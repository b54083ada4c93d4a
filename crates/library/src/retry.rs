//! Rate limit backoff.
//!
//! A guarded operation is attempted until it either succeeds or fails with
//! something other than a rate limit. Each rate limit is waited out (the wait
//! the platform asked for plus a safety [`Margin`]) and the operation is
//! attempted again, with no upper bound on the number of attempts.

use std::future::Future;
use std::time::Duration;
use tgtracks_telegram::error::Result as ChatResult;

/// Extra time slept on top of the platform's requested wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Margin(Duration);

impl Margin {
    /// Uploads and text messages.
    pub const SEND: Self = Self(Duration::from_secs(180));
    /// Pinning and deleting.
    pub const PIN: Self = Self(Duration::from_secs(5));

    pub fn duration(&self) -> Duration {
        self.0
    }
}

enum State<T> {
    Attempting(u32),
    Done(T),
}

/// Run `operation` until it stops being rate limited.
///
/// Any error other than a rate limit is returned unchanged.
pub async fn with_backoff<T, F, Fut>(what: &str, margin: Margin, mut operation: F) -> ChatResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ChatResult<T>>,
{
    let mut state = State::Attempting(1);
    loop {
        state = match state {
            State::Done(value) => return Ok(value),
            State::Attempting(attempt) => match operation().await {
                Ok(value) => State::Done(value),
                Err(err) => {
                    let Some(retry_after) = err.retry_after() else {
                        return Err(err);
                    };
                    let wait = Duration::from_secs(retry_after) + margin.duration();
                    tracing::info!(
                        operation = what,
                        attempt,
                        retry_after,
                        wait_secs = wait.as_secs(),
                        "Rate limited; waiting before retrying"
                    );
                    tokio::time::sleep(wait).await;
                    State::Attempting(attempt + 1)
                },
            },
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tgtracks_telegram::error::ErrorKind;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_then_success() {
        let counter = AtomicU32::new(0);
        let attempts = &counter;
        let start = Instant::now();
        let result = with_backoff("send", Margin::SEND, || async move {
            match attempts.fetch_add(1, Ordering::SeqCst) {
                0 => Err(exn::Exn::from(ErrorKind::RateLimited { retry_after: 5 })),
                _ => Ok(42),
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert_eq!(start.elapsed(), Duration::from_secs(5 + 180));
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_rate_limits_are_unbounded() {
        let counter = AtomicU32::new(0);
        let attempts = &counter;
        let start = Instant::now();
        let result = with_backoff("pin", Margin::PIN, || async move {
            match attempts.fetch_add(1, Ordering::SeqCst) {
                n if n < 10 => Err(exn::Exn::from(ErrorKind::RateLimited { retry_after: 1 })),
                _ => Ok(()),
            }
        })
        .await;
        assert!(result.is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 11);
        assert_eq!(start.elapsed(), Duration::from_secs(10 * (1 + 5)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_errors_propagate_immediately() {
        let counter = AtomicU32::new(0);
        let attempts = &counter;
        let start = Instant::now();
        let result: ChatResult<()> = with_backoff("send", Margin::SEND, || async move {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(exn::Exn::from(ErrorKind::Network("sendAudio")))
        })
        .await;
        assert_eq!(*result.unwrap_err(), ErrorKind::Network("sendAudio"));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
