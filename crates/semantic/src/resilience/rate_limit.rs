//! Token-bucket rate limiting.
//!
//! Used in front of remote embedding providers and, through
//! [`RateLimitManager`], for per-client limits at the HTTP boundary.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Configuration for a token bucket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Sustained refill rate.
    pub requests_per_second: f64,
    /// Bucket capacity (instant burst).
    pub burst_size: u64,
    /// Longest [`TokenBucket::acquire`] will wait, in milliseconds.
    #[serde(with = "crate::serde_millis")]
    pub max_wait: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 10.0,
            burst_size: 20,
            max_wait: Duration::from_secs(5),
        }
    }
}

impl RateLimitConfig {
    pub fn with_requests_per_second(mut self, rps: f64) -> Self {
        self.requests_per_second = rps;
        self
    }

    pub fn with_burst_size(mut self, burst: u64) -> Self {
        self.burst_size = burst;
        self
    }

    pub fn with_max_wait(mut self, wait: Duration) -> Self {
        self.max_wait = wait;
        self
    }
}

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_update: Instant,
}

#[derive(Debug)]
pub struct TokenBucket {
    config: RateLimitConfig,
    state: Mutex<BucketState>,
    total_requests: AtomicU64,
    total_waited: AtomicU64,
    total_rejected: AtomicU64,
}

impl TokenBucket {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            state: Mutex::new(BucketState {
                tokens: config.burst_size as f64,
                last_update: Instant::now(),
            }),
            total_requests: AtomicU64::new(0),
            total_waited: AtomicU64::new(0),
            total_rejected: AtomicU64::new(0),
        }
    }

    fn refilled(&self) -> MutexGuard<'_, BucketState> {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let now = Instant::now();
        let elapsed = now.duration_since(state.last_update).as_secs_f64();
        state.last_update = now;
        state.tokens =
            (state.tokens + elapsed * self.config.requests_per_second).min(self.config.burst_size as f64);
        state
    }

    /// Takes a token if one is available right now.
    pub fn try_acquire(&self) -> bool {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        let mut state = self.refilled();
        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            true
        } else {
            self.total_rejected.fetch_add(1, Ordering::Relaxed);
            false
        }
    }

    /// Takes a token, sleeping up to `max_wait` for one to refill.
    pub async fn acquire(&self) -> bool {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        let start = Instant::now();
        let mut waited = false;

        loop {
            let wait = {
                let mut state = self.refilled();
                if state.tokens >= 1.0 {
                    state.tokens -= 1.0;
                    if waited {
                        self.total_waited.fetch_add(1, Ordering::Relaxed);
                    }
                    return true;
                }
                if start.elapsed() >= self.config.max_wait || self.config.requests_per_second <= 0.0 {
                    self.total_rejected.fetch_add(1, Ordering::Relaxed);
                    return false;
                }
                let needed = (1.0 - state.tokens) / self.config.requests_per_second;
                let remaining = self.config.max_wait.saturating_sub(start.elapsed());
                Duration::from_secs_f64(needed.min(0.1)).min(remaining)
            };

            waited = true;
            tokio::time::sleep(wait.max(Duration::from_millis(1))).await;
        }
    }

    pub fn stats(&self) -> RateLimitStats {
        RateLimitStats {
            available_tokens: self.refilled().tokens,
            total_requests: self.total_requests.load(Ordering::Relaxed),
            total_waited: self.total_waited.load(Ordering::Relaxed),
            total_rejected: self.total_rejected.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RateLimitStats {
    pub available_tokens: f64,
    pub total_requests: u64,
    pub total_waited: u64,
    pub total_rejected: u64,
}

impl RateLimitStats {
    pub fn rejection_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.total_rejected as f64 / self.total_requests as f64
        }
    }
}

/// One bucket per key, created on first use.
#[derive(Debug)]
pub struct RateLimitManager {
    buckets: DashMap<String, Arc<TokenBucket>>,
    default_config: RateLimitConfig,
}

impl RateLimitManager {
    pub fn new(default_config: RateLimitConfig) -> Self {
        Self {
            buckets: DashMap::new(),
            default_config,
        }
    }

    pub fn get_or_create(&self, key: &str) -> Arc<TokenBucket> {
        self.buckets
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(TokenBucket::new(self.default_config)))
            .clone()
    }

    /// Non-blocking check for `key`.
    pub fn check(&self, key: &str) -> bool {
        self.get_or_create(key).try_acquire()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

impl Default for RateLimitManager {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}
