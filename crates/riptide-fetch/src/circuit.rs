//! A minimal circuit breaker paired with retry/backoff, so a host that is
//! consistently failing stops being hammered between retry attempts.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

/// Circuit breaker configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub failure_threshold: u32,
    pub open_cooldown_ms: u64,
    pub half_open_max_in_flight: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            open_cooldown_ms: 30_000,
            half_open_max_in_flight: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Closed,
    Open,
    HalfOpen,
}

struct Inner {
    state: State,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    half_open_in_flight: u32,
}

/// Per-host circuit breaker. Opens after `failure_threshold` consecutive
/// failures, refuses calls for `open_cooldown_ms`, then allows a bounded
/// number of half-open probes before fully closing again.
pub struct CircuitBreaker {
    config: Config,
    inner: Mutex<Inner>,
    trips: AtomicU32,
    last_trip_ms: AtomicU64,
}

/// Error returned when a call is rejected without being attempted.
#[derive(Debug, thiserror::Error)]
pub enum CircuitError<E> {
    #[error("circuit open")]
    Open,
    #[error(transparent)]
    Inner(#[from] E),
}

impl CircuitBreaker {
    pub fn new(config: Config) -> Arc<Self> {
        Arc::new(Self {
            config,
            inner: Mutex::new(Inner {
                state: State::Closed,
                consecutive_failures: 0,
                opened_at: None,
                half_open_in_flight: 0,
            }),
            trips: AtomicU32::new(0),
            last_trip_ms: AtomicU64::new(0),
        })
    }

    async fn pre_call(&self) -> Result<(), ()> {
        let mut inner = self.inner.lock().await;
        match inner.state {
            State::Closed => Ok(()),
            State::Open => {
                let elapsed = inner
                    .opened_at
                    .map(|t| t.elapsed())
                    .unwrap_or(Duration::MAX);
                if elapsed >= Duration::from_millis(self.config.open_cooldown_ms) {
                    inner.state = State::HalfOpen;
                    inner.half_open_in_flight = 1;
                    Ok(())
                } else {
                    Err(())
                }
            }
            State::HalfOpen => {
                if inner.half_open_in_flight < self.config.half_open_max_in_flight {
                    inner.half_open_in_flight += 1;
                    Ok(())
                } else {
                    Err(())
                }
            }
        }
    }

    async fn on_success(&self) {
        let mut inner = self.inner.lock().await;
        inner.consecutive_failures = 0;
        inner.state = State::Closed;
        inner.opened_at = None;
        inner.half_open_in_flight = 0;
    }

    async fn on_failure(&self) {
        let mut inner = self.inner.lock().await;
        inner.consecutive_failures += 1;
        if inner.state == State::HalfOpen || inner.consecutive_failures >= self.config.failure_threshold {
            inner.state = State::Open;
            inner.opened_at = Some(Instant::now());
            inner.half_open_in_flight = 0;
            self.trips.fetch_add(1, Ordering::Relaxed);
            self.last_trip_ms.store(now_ms(), Ordering::Relaxed);
            warn!(
                consecutive_failures = inner.consecutive_failures,
                "circuit breaker opened"
            );
        }
    }

    pub async fn state(&self) -> State {
        self.inner.lock().await.state
    }
}

fn now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Run `f` under the breaker's guard, recording success/failure.
pub async fn guarded_call<F, Fut, T, E>(
    breaker: &Arc<CircuitBreaker>,
    f: F,
) -> Result<T, CircuitError<E>>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
{
    if breaker.pre_call().await.is_err() {
        return Err(CircuitError::Open);
    }
    match f().await {
        Ok(value) => {
            breaker.on_success().await;
            Ok(value)
        }
        Err(err) => {
            breaker.on_failure().await;
            Err(CircuitError::Inner(err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn opens_after_threshold_consecutive_failures() {
        let breaker = CircuitBreaker::new(Config {
            failure_threshold: 2,
            open_cooldown_ms: 10_000,
            half_open_max_in_flight: 1,
        });

        let _ = guarded_call(&breaker, || async { Err::<(), &str>("boom") }).await;
        assert_eq!(breaker.state().await, State::Closed);
        let _ = guarded_call(&breaker, || async { Err::<(), &str>("boom") }).await;
        assert_eq!(breaker.state().await, State::Open);
    }

    #[tokio::test]
    async fn rejects_calls_while_open() {
        let breaker = CircuitBreaker::new(Config {
            failure_threshold: 1,
            open_cooldown_ms: 10_000,
            half_open_max_in_flight: 1,
        });
        let _ = guarded_call(&breaker, || async { Err::<(), &str>("boom") }).await;
        let result = guarded_call(&breaker, || async { Ok::<(), &str>(()) }).await;
        assert!(matches!(result, Err(CircuitError::Open)));
    }

    #[tokio::test]
    async fn success_resets_to_closed() {
        let breaker = CircuitBreaker::new(Config::default());
        let _ = guarded_call(&breaker, || async { Ok::<(), &str>(()) }).await;
        assert_eq!(breaker.state().await, State::Closed);
    }
}
