use error_stack::{Context, Result};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Retries a fallible asynchronous operation with exponential backoff.
///
/// Only errors accepted by [`RetryBuilder::retry_if`] are retried; any
/// other error is returned on the spot. Once the retries are exhausted
/// the last error is returned.
pub struct Retry<C, E> {
    builder: RetryBuilder<C, E>,
    tries: usize,
}

impl<O, E: Context, F: Future<Output = Result<O, E>>, C: FnMut() -> F> Retry<C, E> {
    #[must_use]
    #[inline]
    pub fn builder(name: &'static str, callback: C) -> RetryBuilder<C, E> {
        RetryBuilder::new(name, callback)
    }

    pub async fn run(mut self) -> Result<O, E> {
        loop {
            self.tries += 1;
            debug!(tries = %self.tries, "(re)trying task {:?}...", self.builder.name);

            let error = match (self.builder.callback)().await {
                Ok(output) => return Ok(output),
                Err(error) => error,
            };

            let retryable = self
                .builder
                .retry_if
                .map_or(true, |predicate| predicate(error.current_context()));

            // `tries` counts the first attempt as well
            if !retryable || self.tries > self.builder.max_retries {
                return Err(error);
            }

            let wait = self.builder.delay_for(self.tries - 1);
            warn!(
                tries = %self.tries,
                error = %error.current_context(),
                "operation {:?} failed. retrying in {:?}...",
                self.builder.name, wait
            );
            tokio::time::sleep(wait).await;
        }
    }
}

#[must_use]
pub struct RetryBuilder<C, E> {
    callback: C,
    max_retries: usize,
    name: &'static str,
    retry_if: Option<fn(&E) -> bool>,
    wait: Duration,
    max_wait: Duration,
}

impl<C, E> RetryBuilder<C, E> {
    pub const DEFAULT_MAX_RETRIES: usize = 2;
    pub const DEFAULT_WAIT: Duration = Duration::from_secs(1);
    pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(5);

    pub fn new(name: &'static str, callback: C) -> Self {
        Self {
            callback,
            max_retries: Self::DEFAULT_MAX_RETRIES,
            name,
            retry_if: None,
            wait: Self::DEFAULT_WAIT,
            max_wait: Self::DEFAULT_MAX_WAIT,
        }
    }

    pub fn max_retries(self, max_retries: usize) -> Self {
        Self {
            max_retries,
            ..self
        }
    }

    /// Delay before the first retry. It doubles on every later retry.
    pub fn wait(self, duration: Duration) -> Self {
        Self {
            wait: duration,
            ..self
        }
    }

    pub fn max_wait(self, duration: Duration) -> Self {
        Self {
            max_wait: duration,
            ..self
        }
    }

    pub fn retry_if(self, predicate: fn(&E) -> bool) -> Self {
        Self {
            retry_if: Some(predicate),
            ..self
        }
    }

    pub fn build(self) -> Retry<C, E> {
        Retry {
            builder: self,
            tries: 0,
        }
    }

    /// `min(wait * 2^attempt, max_wait)`
    fn delay_for(&self, attempt: usize) -> Duration {
        let factor = u32::try_from(attempt)
            .ok()
            .and_then(|attempt| 2u32.checked_pow(attempt))
            .unwrap_or(u32::MAX);

        self.wait
            .checked_mul(factor)
            .map_or(self.max_wait, |delay| delay.min(self.max_wait))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use error_stack::Report;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use thiserror::Error;
    use tokio::time::Instant;

    #[derive(Debug, Error)]
    enum FetchError {
        #[error("connection reset")]
        Transient,
        #[error("not found")]
        Permanent,
    }

    fn is_transient(error: &FetchError) -> bool {
        matches!(error, FetchError::Transient)
    }

    #[test]
    fn delay_grows_and_is_capped() {
        let builder = Retry::<_, FetchError>::builder("delays", || async { Ok::<_, Report<FetchError>>(()) });
        assert_eq!(builder.delay_for(0), Duration::from_secs(1));
        assert_eq!(builder.delay_for(1), Duration::from_secs(2));
        assert_eq!(builder.delay_for(2), Duration::from_secs(4));
        assert_eq!(builder.delay_for(3), Duration::from_secs(5));
        assert_eq!(builder.delay_for(64), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_errors_then_gives_up() {
        let calls = AtomicUsize::new(0);
        let started = Instant::now();

        let result = Retry::builder("always fails", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(Report::new(FetchError::Transient)) }
        })
        .max_retries(2)
        .retry_if(is_transient)
        .build()
        .run()
        .await;

        assert!(matches!(result.unwrap_err().current_context(), FetchError::Transient));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 1s + 2s of backoff
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_errors_are_not_retried() {
        let calls = AtomicUsize::new(0);
        let result = Retry::builder("not found", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(Report::new(FetchError::Permanent)) }
        })
        .retry_if(is_transient)
        .build()
        .run()
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_a_transient_failure() {
        let calls = AtomicUsize::new(0);
        let result = Retry::builder("flaky", || {
            let attempt = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt == 0 {
                    Err(Report::new(FetchError::Transient))
                } else {
                    Ok(attempt)
                }
            }
        })
        .retry_if(is_transient)
        .build()
        .run()
        .await;

        assert_eq!(result.unwrap(), 1);
    }
}
