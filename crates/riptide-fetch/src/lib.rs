//! The Fetcher Adapter: a `reqwest`-backed implementation of the
//! `FetcherAdapter` port, wrapped in retry/backoff and a circuit breaker.

pub mod circuit;
pub mod fetch;

pub use circuit::{CircuitBreaker, State as CircuitState};
pub use fetch::{CircuitBreakerConfig, ReqwestFetcher};
