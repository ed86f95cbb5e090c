//! Generation service clients.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use semantic::resilience::{CircuitBreaker, CircuitBreakerConfig};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::GenerationError;

/// Turns a prompt into raw text. No format guarantee beyond "plausibly
/// contains a JSON object"; see [`crate::parse_advice`].
#[async_trait]
pub trait GenerationService: Send + Sync {
    fn model_name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    /// `"gemini"` or `"disabled"`.
    pub provider: String,
    pub model: String,
    /// Never serialized back out.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub temperature: Option<f32>,
    /// HTTP-level timeout. The pipeline applies its own overall timeout on top.
    pub request_timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circuit_breaker: Option<CircuitBreakerConfig>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".into(),
            model: "gemini-2.0-flash".into(),
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            temperature: None,
            request_timeout_secs: 30,
            circuit_breaker: None,
        }
    }
}

impl GenerationConfig {
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn validate(&self) -> Result<(), GenerationError> {
        match self.provider.as_str() {
            "gemini" | "disabled" => {}
            other => {
                return Err(GenerationError::InvalidConfig(format!(
                    "unknown generation provider '{other}'"
                )))
            }
        }
        if self.model.trim().is_empty() {
            return Err(GenerationError::InvalidConfig("model must not be empty".into()));
        }
        if self.base_url.trim().is_empty() {
            return Err(GenerationError::InvalidConfig("base_url must not be empty".into()));
        }
        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(GenerationError::InvalidConfig(
                    "temperature must be between 0.0 and 2.0".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Builds the configured generator. A Gemini provider without an API key
/// degrades to [`DisabledGenerator`], which sends every request to the
/// fallback path.
pub fn build_generator(
    cfg: &GenerationConfig,
) -> Result<Arc<dyn GenerationService>, GenerationError> {
    cfg.validate()?;
    match (cfg.provider.as_str(), cfg.api_key()) {
        ("gemini", Some(_)) => Ok(Arc::new(GeminiClient::from_config(cfg)?)),
        ("gemini", None) => {
            warn!(model = %cfg.model, "generation_disabled_no_api_key");
            Ok(Arc::new(DisabledGenerator))
        }
        _ => Ok(Arc::new(DisabledGenerator)),
    }
}

/// Always fails with [`GenerationError::Disabled`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGenerator;

#[async_trait]
impl GenerationService for DisabledGenerator {
    fn model_name(&self) -> &str {
        "disabled"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Disabled)
    }
}

/// Google Gemini `generateContent` client with JSON response mode.
pub struct GeminiClient {
    endpoint: String,
    api_key: String,
    model: String,
    temperature: Option<f32>,
    client: reqwest::Client,
    breaker: CircuitBreaker,
}

impl GeminiClient {
    pub fn from_config(cfg: &GenerationConfig) -> Result<Self, GenerationError> {
        let api_key = cfg
            .api_key()
            .ok_or_else(|| GenerationError::InvalidConfig("api_key is required for gemini".into()))?
            .to_string();

        let timeout = Duration::from_secs(cfg.request_timeout_secs.max(1));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10).min(timeout))
            .build()
            .map_err(|e| GenerationError::InvalidConfig(format!("http client: {e}")))?;

        Ok(Self {
            endpoint: format!(
                "{}/models/{}:generateContent",
                cfg.base_url.trim_end_matches('/'),
                cfg.model
            ),
            api_key,
            model: cfg.model.clone(),
            temperature: cfg.temperature,
            client,
            breaker: CircuitBreaker::new("gemini", cfg.circuit_breaker.unwrap_or_default()),
        })
    }

    fn payload(&self, prompt: &str) -> serde_json::Value {
        let mut generation_config = json!({ "responseMimeType": "application/json" });
        if let Some(t) = self.temperature {
            generation_config["temperature"] = json!(t);
        }
        json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": generation_config,
        })
    }

    async fn send(&self, prompt: &str) -> Result<String, GenerationError> {
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&self.payload(prompt))
            .send()
            .await
            .map_err(|e| GenerationError::Http(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: body.chars().take(512).collect(),
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Http(format!("invalid response body: {e}")))?;
        parsed.into_text()
    }
}

#[async_trait]
impl GenerationService for GeminiClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        if !self.breaker.allow_request() {
            return Err(GenerationError::CircuitOpen(self.breaker.name().to_string()));
        }
        match self.send(prompt).await {
            Ok(text) => {
                self.breaker.record_success();
                debug!(model = %self.model, chars = text.len(), "generation_success");
                Ok(text)
            }
            Err(err) => {
                self.breaker.record_failure();
                Err(err)
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Default, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, all parts concatenated.
    fn into_text(self) -> Result<String, GenerationError> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        if text.trim().is_empty() {
            Err(GenerationError::EmptyResponse)
        } else {
            Ok(text)
        }
    }
}
