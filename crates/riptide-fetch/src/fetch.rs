//! `ReqwestFetcher`: the in-core `FetcherAdapter` implementation, built on
//! `reqwest` and wrapped with the shared retry/backoff policy plus a
//! per-client circuit breaker. Stands in for a headless-browser adapter
//! for plain-HTTP crawling and in tests.

use crate::circuit::{guarded_call, CircuitBreaker, Config as CircuitConfig};
use async_trait::async_trait;
use reqwest::Client;
use riptide_reliability::RetryPolicy;
use riptide_types::model::{ErrorKind, Fingerprint};
use riptide_types::ports::{FetchOptions, FetchOutcome, FetcherAdapter, PageOutcome};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Circuit breaker tuning, exposed separately from [`RetryPolicy`] since
/// it guards the whole client rather than a single call.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub open_cooldown_ms: u64,
    pub half_open_max_in_flight: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            open_cooldown_ms: 30_000,
            half_open_max_in_flight: 3,
        }
    }
}

/// `reqwest`-backed fetcher with retry + circuit breaker.
pub struct ReqwestFetcher {
    client: Client,
    retry: RetryPolicy,
    circuit_breaker: Arc<CircuitBreaker>,
}

impl ReqwestFetcher {
    pub fn new(retry: RetryPolicy, circuit_config: CircuitBreakerConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .gzip(true)
            .brotli(true)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?;

        Ok(Self {
            client,
            retry,
            circuit_breaker: CircuitBreaker::new(CircuitConfig {
                failure_threshold: circuit_config.failure_threshold,
                open_cooldown_ms: circuit_config.open_cooldown_ms,
                half_open_max_in_flight: circuit_config.half_open_max_in_flight,
            }),
        })
    }

    async fn single_attempt(
        &self,
        url: &str,
        fingerprint: &Fingerprint,
        options: &FetchOptions,
    ) -> Result<PageOutcome, (ErrorKind, Option<u16>)> {
        let request = self
            .client
            .get(url)
            .header("User-Agent", &fingerprint.user_agent)
            .header("Accept-Language", &fingerprint.locale)
            .timeout(options.timeout)
            .danger_accept_invalid_certs(options.insecure)
            .build()
            .map_err(|_| (ErrorKind::InvalidUrl, None))?;

        let response = match guarded_call(&self.circuit_breaker, || self.client.execute(request))
            .await
        {
            Ok(resp) => resp,
            Err(crate::circuit::CircuitError::Open) => {
                return Err((ErrorKind::TransportError, None))
            }
            Err(crate::circuit::CircuitError::Inner(e)) => {
                return Err((classify_transport_error(&e), None));
            }
        };

        let final_url = response.url().to_string();
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect::<HashMap<_, _>>();

        if let Some(kind) = classify_status(status) {
            return Err((kind, Some(status)));
        }

        let body = response
            .text()
            .await
            .map_err(|_| (ErrorKind::TransportError, Some(status)))?;
        let title = extract_title(&body);

        Ok(PageOutcome {
            final_url,
            status: Some(status),
            headers,
            body,
            title,
            screenshot: None,
        })
    }
}

#[async_trait]
impl FetcherAdapter for ReqwestFetcher {
    #[instrument(skip(self, fingerprint, options), fields(url = %url))]
    async fn fetch(
        &self,
        url: &str,
        fingerprint: &Fingerprint,
        options: &FetchOptions,
    ) -> FetchOutcome {
        let mut last_kind = ErrorKind::TransportError;
        let mut last_status = None;

        for attempt in 0..self.retry.max_attempts {
            match self.single_attempt(url, fingerprint, options).await {
                Ok(outcome) => {
                    if attempt > 0 {
                        debug!(attempts = attempt + 1, "fetch succeeded after retry");
                    }
                    return FetchOutcome::Success(outcome);
                }
                Err((kind, status)) => {
                    last_kind = kind;
                    last_status = status;
                    if !kind.is_retryable() {
                        return FetchOutcome::Permanent { kind, status };
                    }
                    if attempt + 1 < self.retry.max_attempts {
                        let delay = self.retry.backoff_duration(attempt);
                        warn!(?kind, attempt, delay_ms = delay.as_millis(), "retrying fetch");
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        FetchOutcome::Retryable {
            kind: last_kind,
            status: last_status,
        }
    }
}

fn classify_status(status: u16) -> Option<ErrorKind> {
    match status {
        200..=299 => None,
        429 => Some(ErrorKind::HttpRateLimited),
        408 => Some(ErrorKind::FetchTimeout),
        400..=499 => Some(ErrorKind::HttpClientError),
        500..=599 => Some(ErrorKind::HttpServerError),
        _ => None,
    }
}

fn classify_transport_error(err: &reqwest::Error) -> ErrorKind {
    if err.is_timeout() {
        ErrorKind::FetchTimeout
    } else {
        ErrorKind::TransportError
    }
}

fn extract_title(body: &str) -> Option<String> {
    let lower = body.to_ascii_lowercase();
    let start = lower.find("<title>")? + "<title>".len();
    let end = lower[start..].find("</title>")? + start;
    Some(body[start..end].trim().to_string())
}
