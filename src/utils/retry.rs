use std::time::Duration;
use tokio::time::sleep;

// ============================================================================
// Exponential Backoff Retry Strategy
// ============================================================================
//
// Used at start-up while the database may still be coming up. Request
// handling never retries.
//
// ============================================================================

#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Maximum number of attempts, the first one included
    pub max_attempts: u32,
    /// Initial delay before first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Database connection at boot: about a minute of patience.
    pub fn startup() -> Self {
        Self {
            max_attempts: 8,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(15),
            multiplier: 2.0,
        }
    }

    fn next_delay(&self, delay: Duration) -> Duration {
        Duration::from_millis(((delay.as_millis() as f64) * self.multiplier) as u64).min(self.max_delay)
    }
}

#[derive(Debug)]
pub enum RetryResult<T, E> {
    Success(T),
    /// Still transient on the last attempt
    Failed(E),
    /// Not worth retrying
    PermanentFailure(E),
}

impl<T, E> RetryResult<T, E> {
    pub fn into_result(self) -> Result<T, E> {
        match self {
            RetryResult::Success(value) => Ok(value),
            RetryResult::Failed(e) | RetryResult::PermanentFailure(e) => Err(e),
        }
    }
}

/// Errors that may clear up on their own (connection refused, pool timeout).
pub trait IsTransient {
    fn is_transient(&self) -> bool;
}

impl IsTransient for sqlx::Error {
    fn is_transient(&self) -> bool {
        matches!(
            self,
            sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Tls(_)
        )
    }
}

/// Run `operation` until it succeeds, fails permanently, or the attempt
/// budget is spent. `operation` receives the 1-based attempt number.
pub async fn retry_on_transient<F, Fut, T, E>(
    config: RetryConfig,
    mut operation: F,
) -> RetryResult<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display + IsTransient,
{
    let mut delay = config.initial_delay;
    let mut attempt = 1;

    loop {
        let error = match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(attempt, "Succeeded after retrying");
                }
                return RetryResult::Success(value);
            }
            Err(error) => error,
        };

        if !error.is_transient() {
            tracing::error!(attempt, error = %error, "Permanent failure, giving up");
            return RetryResult::PermanentFailure(error);
        }
        if attempt >= config.max_attempts {
            tracing::error!(attempt, error = %error, "Retry budget exhausted");
            return RetryResult::Failed(error);
        }

        tracing::warn!(
            attempt,
            max_attempts = config.max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "Transient failure, backing off"
        );
        sleep(delay).await;
        delay = config.next_delay(delay);
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Debug)]
    struct Failure {
        transient: bool,
    }

    impl std::fmt::Display for Failure {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "failure (transient: {})", self.transient)
        }
    }

    impl IsTransient for Failure {
        fn is_transient(&self) -> bool {
            self.transient
        }
    }

    fn fast() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(100),
            multiplier: 2.0,
        }
    }

    #[tokio::test]
    async fn test_retry_succeeds_eventually() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = retry_on_transient(fast(), |_attempt| {
            let counter = counter_clone.clone();
            async move {
                let count = counter.fetch_add(1, Ordering::SeqCst);
                if count < 2 {
                    Err(Failure { transient: true })
                } else {
                    Ok("connected")
                }
            }
        })
        .await;

        assert!(matches!(result, RetryResult::Success("connected")));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_fails_after_max_attempts() {
        let result = retry_on_transient(fast(), |_attempt| async {
            Err::<(), _>(Failure { transient: true })
        })
        .await;

        assert!(matches!(result, RetryResult::Failed(_)));
    }

    #[tokio::test]
    async fn test_permanent_failure_stops_immediately() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = retry_on_transient(fast(), |_attempt| {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(Failure { transient: false })
            }
        })
        .await;

        assert!(matches!(result, RetryResult::PermanentFailure(_)));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(result.into_result().is_err());
    }

    #[test]
    fn test_delay_is_capped() {
        let config = fast();
        assert_eq!(config.next_delay(Duration::from_millis(10)), Duration::from_millis(20));
        assert_eq!(config.next_delay(Duration::from_millis(80)), Duration::from_millis(100));
    }

    #[test]
    fn test_sqlx_error_classification() {
        assert!(sqlx::Error::PoolTimedOut.is_transient());
        assert!(!sqlx::Error::RowNotFound.is_transient());
    }
}
