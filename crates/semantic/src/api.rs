use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::normalize::l2_normalize_in_place;
use crate::resilience::{
    execute_with_retry_async, CircuitBreaker, RateLimitConfig, RetryConfig, TokenBucket,
};
use crate::{Embedder, SemanticConfig, SemanticError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ApiProviderKind {
    HuggingFace,
    OpenAI,
    Custom,
}

impl ApiProviderKind {
    fn from_hint(hint: Option<&str>) -> Self {
        match hint.unwrap_or("custom").to_ascii_lowercase().as_str() {
            "hf" | "huggingface" => ApiProviderKind::HuggingFace,
            "openai" | "gpt" => ApiProviderKind::OpenAI,
            _ => ApiProviderKind::Custom,
        }
    }

    fn payload(self, texts: &[String], model: &str) -> Value {
        match self {
            ApiProviderKind::HuggingFace => json!({ "inputs": texts }),
            ApiProviderKind::OpenAI => json!({ "input": texts, "model": model }),
            ApiProviderKind::Custom => json!({ "texts": texts }),
        }
    }
}

/// Remote embedding provider over HTTP.
///
/// Each instance owns its HTTP client, retry policy, circuit breaker, and
/// rate limiter, so two embedders pointed at different providers never share
/// failure state.
pub struct ApiEmbedder {
    url: String,
    auth_header: Option<String>,
    provider: ApiProviderKind,
    provider_label: String,
    model_name: String,
    normalize: bool,
    resilience: bool,
    client: reqwest::Client,
    retry: RetryConfig,
    breaker: CircuitBreaker,
    limiter: TokenBucket,
}

impl ApiEmbedder {
    pub fn from_config(cfg: &SemanticConfig) -> Result<Self, SemanticError> {
        let url = cfg
            .api_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| SemanticError::InvalidConfig("api_url is required for api mode".into()))?
            .to_string();

        let timeout = Duration::from_secs(cfg.api_timeout_secs.unwrap_or(30).max(1));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10).min(timeout))
            .pool_max_idle_per_host(32)
            .build()
            .map_err(|e| SemanticError::InvalidConfig(format!("http client: {e}")))?;

        let provider_label = cfg
            .api_provider
            .as_deref()
            .unwrap_or("custom")
            .to_ascii_lowercase();

        Ok(Self {
            url,
            auth_header: cfg.api_auth_header.clone(),
            provider: ApiProviderKind::from_hint(cfg.api_provider.as_deref()),
            breaker: CircuitBreaker::new(
                provider_label.clone(),
                cfg.circuit_breaker_config.unwrap_or_default(),
            ),
            provider_label,
            model_name: cfg.model_name.clone(),
            normalize: cfg.normalize,
            resilience: cfg.enable_resilience,
            client,
            retry: cfg.retry_config.unwrap_or_default(),
            limiter: TokenBucket::new(cfg.rate_limit_config.unwrap_or_else(RateLimitConfig::default)),
        })
    }

    async fn send(&self, payload: &Value) -> Result<Value, SemanticError> {
        let mut request = self.client.post(&self.url).json(payload);
        if let Some(header) = self.auth_header.as_deref() {
            request = request.header("Authorization", header);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SemanticError::Http(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SemanticError::Http(format!("HTTP error {status}: {body}")));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| SemanticError::Inference(format!("invalid JSON response: {e}")))
    }

    async fn call(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, SemanticError> {
        let payload = self.provider.payload(texts, &self.model_name);

        let response = if self.resilience {
            if !self.breaker.allow_request() {
                return Err(SemanticError::CircuitOpen(self.provider_label.clone()));
            }
            if !self.limiter.acquire().await {
                return Err(SemanticError::RateLimited(self.provider_label.clone()));
            }

            let outcome = execute_with_retry_async(
                &self.retry,
                SemanticError::is_transient,
                |attempt| {
                    if attempt > 0 {
                        warn!(provider = %self.provider_label, attempt, "embedding_retry");
                    }
                    self.send(&payload)
                },
            )
            .await;
            debug!(
                provider = %self.provider_label,
                attempts = outcome.attempts,
                elapsed_ms = outcome.total_duration.as_millis() as u64,
                "embedding_call"
            );

            match outcome.into_result() {
                Ok(value) => {
                    self.breaker.record_success();
                    value
                }
                Err(err) => {
                    self.breaker.record_failure();
                    return Err(err);
                }
            }
        } else {
            self.send(&payload).await?
        };

        let mut vectors = parse_embeddings_from_value(response)?;
        if vectors.len() != texts.len() {
            return Err(SemanticError::Inference(format!(
                "API returned {} embeddings for {} inputs",
                vectors.len(),
                texts.len()
            )));
        }
        if let Some(first) = vectors.first().map(Vec::len) {
            if let Some(bad) = vectors.iter().find(|v| v.len() != first) {
                return Err(SemanticError::DimensionMismatch {
                    expected: first,
                    actual: bad.len(),
                });
            }
        }
        if self.normalize {
            vectors.iter_mut().for_each(|v| l2_normalize_in_place(v));
        }
        Ok(vectors)
    }
}

#[async_trait]
impl Embedder for ApiEmbedder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimension(&self) -> Option<usize> {
        None
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, SemanticError> {
        if text.trim().is_empty() {
            return Err(SemanticError::EmptyInput);
        }
        let mut vectors = self.call(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| SemanticError::Inference("API response did not contain embeddings".into()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, SemanticError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if texts.iter().any(|t| t.trim().is_empty()) {
            return Err(SemanticError::EmptyInput);
        }
        self.call(texts).await
    }
}

/// Accepts the response shapes of the supported providers:
/// `{"embeddings": [[..]]}`, OpenAI's `{"data": [{"embedding": [..]}]}`, a
/// bare list of vectors, or a single bare vector.
fn parse_embeddings_from_value(value: Value) -> Result<Vec<Vec<f32>>, SemanticError> {
    match value {
        Value::Object(mut map) => {
            if let Some(embeddings) = map.remove("embeddings") {
                return parse_embedding_collection(embeddings);
            }
            if let Some(Value::Array(items)) = map.remove("data") {
                return items
                    .into_iter()
                    .map(|item| match item {
                        Value::Object(mut obj) => obj
                            .remove("embedding")
                            .ok_or_else(|| {
                                SemanticError::Inference(
                                    "missing `embedding` field in data item".into(),
                                )
                            })
                            .and_then(parse_embedding_vector),
                        _ => Err(SemanticError::Inference(
                            "unexpected entry inside `data` array".into(),
                        )),
                    })
                    .collect();
            }
            Err(SemanticError::Inference("unsupported API response shape".into()))
        }
        other => parse_embedding_collection(other),
    }
}

fn parse_embedding_collection(value: Value) -> Result<Vec<Vec<f32>>, SemanticError> {
    match value {
        Value::Array(items) if items.is_empty() => Ok(Vec::new()),
        Value::Array(items) if items.iter().all(Value::is_array) => {
            items.into_iter().map(parse_embedding_vector).collect()
        }
        other => parse_embedding_vector(other).map(|v| vec![v]),
    }
}

fn parse_embedding_vector(value: Value) -> Result<Vec<f32>, SemanticError> {
    match value {
        Value::Array(values) => values
            .into_iter()
            .map(|entry| {
                entry
                    .as_f64()
                    .map(|f| f as f32)
                    .ok_or_else(|| SemanticError::Inference(format!("embedding entries must be numbers, got {entry}")))
            })
            .collect(),
        other => Err(SemanticError::Inference(format!(
            "embedding vector must be an array, got {other}"
        ))),
    }
}
