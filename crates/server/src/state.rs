use std::sync::Arc;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusHandle;
use semantic::resilience::{RateLimitConfig, RateLimitManager};
use snoutiq::Pipeline;
use tokio::sync::Mutex;

use crate::config::ServerConfig;

/// Shared server state
///
/// Owns the one [`Pipeline`] every handler reads from. Reloads publish a new
/// corpus snapshot through it; queries in flight keep the snapshot they took.
pub struct ServerState {
    pub config: ServerConfig,
    pub pipeline: Arc<Pipeline>,
    pub rate_limiter: RateLimitManager,
    pub prometheus: Option<PrometheusHandle>,
    /// Serializes dataset reloads so two rebuilds never race to publish.
    pub reload_lock: Mutex<()>,
    pub start_time: Instant,
}

impl ServerState {
    pub fn new(config: ServerConfig, pipeline: Arc<Pipeline>) -> Self {
        let rate_limit = RateLimitConfig::default()
            .with_requests_per_second(f64::from(config.rate_limit_per_minute) / 60.0)
            .with_burst_size(config.rate_limit_burst.max(1));

        Self {
            config,
            pipeline,
            rate_limiter: RateLimitManager::new(rate_limit),
            prometheus: None,
            reload_lock: Mutex::new(()),
            start_time: Instant::now(),
        }
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }

    /// Check if API key is valid
    pub fn is_valid_api_key(&self, key: &str) -> bool {
        self.config.api_keys.contains(key)
    }

    /// Takes one token from the key's bucket; `false` means over the limit.
    pub fn check_rate_limit(&self, api_key: &str) -> bool {
        self.rate_limiter.check(api_key)
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
