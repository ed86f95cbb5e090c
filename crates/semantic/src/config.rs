use serde::{Deserialize, Serialize};

use crate::resilience::{CircuitBreakerConfig, RateLimitConfig, RetryConfig};
use crate::SemanticError;

/// Runtime configuration describing which embedder to build and how to
/// post-process vectors.
///
/// # Example
/// ```
/// use semantic::SemanticConfig;
///
/// let cfg = SemanticConfig {
///     mode: "api".into(),
///     api_url: Some("https://api-inference.huggingface.co/models/sentence-transformers/all-MiniLM-L6-v2".into()),
///     api_auth_header: Some("Bearer hf_xxx".into()),
///     api_provider: Some("hf".into()),
///     ..Default::default()
/// };
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SemanticConfig {
    /// Vector size tier for the local embedder: `"fast"` (384), `"balanced"`
    /// (768) or `"accurate"` (1024).
    pub tier: String,
    /// Embedder selector: `"fast"` (local, deterministic) or `"api"` (remote HTTP).
    pub mode: String,
    /// Label reported by the embedder and sent to providers that need a model id.
    pub model_name: String,
    /// API inference endpoint when [`mode`](Self::mode) is `"api"`.
    pub api_url: Option<String>,
    /// Authorization header (e.g., `"Bearer hf_xxx"`).
    pub api_auth_header: Option<String>,
    /// Remote provider hint: `"hf"`, `"openai"`, or `"custom"` (default).
    pub api_provider: Option<String>,
    /// Per-request HTTP timeout in seconds.
    pub api_timeout_secs: Option<u64>,
    /// Normalize the resulting vector to unit length.
    pub normalize: bool,
    /// LRU cache capacity in texts; 0 disables caching.
    pub cache_capacity: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_config: Option<RetryConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circuit_breaker_config: Option<CircuitBreakerConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit_config: Option<RateLimitConfig>,
    /// Whether remote calls go through retry, circuit breaker, and rate limiting.
    pub enable_resilience: bool,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            tier: "fast".into(),
            mode: "fast".into(),
            model_name: "all-MiniLM-L6-v2".into(),
            api_url: None,
            api_auth_header: None,
            api_provider: None,
            api_timeout_secs: Some(30),
            normalize: true,
            cache_capacity: 1024,
            retry_config: None,
            circuit_breaker_config: None,
            rate_limit_config: None,
            enable_resilience: true,
        }
    }
}

impl SemanticConfig {
    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }

    pub fn with_tier(mut self, tier: impl Into<String>) -> Self {
        self.tier = tier.into();
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Vector length produced by the local embedder for this tier.
    pub fn tier_dimension(&self) -> usize {
        match self.tier.as_str() {
            "accurate" => 1024,
            "balanced" => 768,
            _ => 384,
        }
    }

    pub fn validate(&self) -> Result<(), SemanticError> {
        match self.tier.as_str() {
            "fast" | "balanced" | "accurate" => {}
            other => {
                return Err(SemanticError::InvalidConfig(format!(
                    "tier must be fast, balanced or accurate, got {other:?}"
                )))
            }
        }
        match self.mode.as_str() {
            "fast" => Ok(()),
            "api" => {
                let url = self.api_url.as_deref().unwrap_or("").trim();
                if url.is_empty() {
                    return Err(SemanticError::InvalidConfig(
                        "api_url is required for api mode".into(),
                    ));
                }
                if self.api_timeout_secs == Some(0) {
                    return Err(SemanticError::InvalidConfig(
                        "api_timeout_secs must be > 0".into(),
                    ));
                }
                Ok(())
            }
            other => Err(SemanticError::InvalidConfig(format!(
                "mode must be fast or api, got {other:?}"
            ))),
        }
    }
}
