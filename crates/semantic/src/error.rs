use thiserror::Error;

/// Errors surfaced by embedders.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SemanticError {
    /// Configuration is inconsistent (e.g. `api` mode without an `api_url`).
    #[error("invalid semantic config: {0}")]
    InvalidConfig(String),
    /// Input text was empty after trimming.
    #[error("cannot embed empty text")]
    EmptyInput,
    /// Transport-level failure talking to a remote provider.
    #[error("http request failed: {0}")]
    Http(String),
    /// The provider answered, but not with usable embeddings.
    #[error("inference failure: {0}")]
    Inference(String),
    /// The circuit breaker is open for this provider.
    #[error("circuit breaker open for provider '{0}'")]
    CircuitOpen(String),
    /// No rate-limit token became available in time.
    #[error("rate limit exceeded for provider '{0}'")]
    RateLimited(String),
    /// A vector came back with an unexpected length.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl SemanticError {
    /// True when retrying the same request later could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            SemanticError::Http(msg) => crate::resilience::is_retryable_error(msg),
            SemanticError::CircuitOpen(_) | SemanticError::RateLimited(_) => true,
            _ => false,
        }
    }
}
