//! YAML configuration for the whole pipeline.
//!
//! Every stage keeps its own config struct; this file only groups them so a
//! deployment can describe the pipeline in one document. Sections that are
//! left out take their defaults.
//!
//! ## Example
//!
//! ```yaml
//! version: "1.0"
//! name: "snoutiq-india"
//!
//! semantic:
//!   tier: "fast"
//!   mode: "fast"
//!   cache_capacity: 2048
//!
//! ranking:
//!   top_k: 10
//!   oversample_factor: 2.0
//!   boost:
//!     emergency: 1.5
//!     urgent: 1.2
//!     routine: 1.0
//!
//! context:
//!   max_matches: 3
//!   max_field_chars: 800
//!
//! generation:
//!   provider: "gemini"
//!   model: "gemini-2.0-flash"
//!
//! timeouts:
//!   embed_ms: 10000
//!   generation_ms: 30000
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use advisor::{ContextConfig, GenerationConfig};
use matcher::RankConfig;
use semantic::SemanticConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading a pipeline configuration.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error in `{section}`: {message}")]
    Validation { section: &'static str, message: String },

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    /// Configuration format version.
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub semantic: SemanticConfig,

    #[serde(default)]
    pub ranking: RankConfig,

    #[serde(default)]
    pub context: ContextConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            name: None,
            semantic: SemanticConfig::default(),
            ranking: RankConfig::default(),
            context: ContextConfig::default(),
            generation: GenerationConfig::default(),
            timeouts: TimeoutConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load a YAML configuration file from the given path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a YAML configuration.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the generation API key, typically from the environment. Blank
    /// keys are ignored.
    pub fn with_generation_api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        if !key.trim().is_empty() {
            self.generation = self.generation.with_api_key(key);
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.semantic
            .validate()
            .map_err(|e| invalid("semantic", e))?;
        self.ranking.validate().map_err(|e| invalid("ranking", e))?;
        self.context.validate().map_err(|e| invalid("context", e))?;
        self.generation
            .validate()
            .map_err(|e| invalid("generation", e))?;
        self.timeouts.validate()
    }
}

fn invalid(section: &'static str, err: impl std::fmt::Display) -> ConfigLoadError {
    ConfigLoadError::Validation {
        section,
        message: err.to_string(),
    }
}

/// Bounds on the two external calls.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Embedding a query. Expiry aborts the request.
    #[serde(default = "default_embed_ms")]
    pub embed_ms: u64,

    /// Generating advice. Expiry routes to the fallback.
    #[serde(default = "default_generation_ms")]
    pub generation_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            embed_ms: default_embed_ms(),
            generation_ms: default_generation_ms(),
        }
    }
}

impl TimeoutConfig {
    pub fn embed(&self) -> Duration {
        Duration::from_millis(self.embed_ms)
    }

    pub fn generation(&self) -> Duration {
        Duration::from_millis(self.generation_ms)
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.embed_ms == 0 {
            return Err(invalid("timeouts", "embed_ms must be greater than 0"));
        }
        if self.generation_ms == 0 {
            return Err(invalid("timeouts", "generation_ms must be greater than 0"));
        }
        Ok(())
    }
}

fn default_version() -> String {
    "1.0".to_string()
}
fn default_embed_ms() -> u64 {
    10_000
}
fn default_generation_ms() -> u64 {
    30_000
}
