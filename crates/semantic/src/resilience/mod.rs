//! Resilience for remote calls: retry with backoff, circuit breaking, and
//! token-bucket rate limiting.

mod circuit_breaker;
mod rate_limit;
mod retry;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use rate_limit::{RateLimitConfig, RateLimitManager, RateLimitStats, TokenBucket};
pub use retry::{execute_with_retry_async, is_retryable_error, RetryConfig, RetryResult};
