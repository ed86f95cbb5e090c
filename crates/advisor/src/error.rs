use thiserror::Error;

/// Failures talking to the generation service.
///
/// None of these reach the caller of the pipeline; every one routes the
/// request to the fallback synthesizer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// No generator is configured (for example, no API key).
    #[error("generation is disabled")]
    Disabled,
    #[error("invalid generation config: {0}")]
    InvalidConfig(String),
    #[error("generation request failed: {0}")]
    Http(String),
    #[error("generation service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("generation timed out after {0} ms")]
    Timeout(u64),
    #[error("circuit breaker open for generator '{0}'")]
    CircuitOpen(String),
    /// The service answered without any candidate text.
    #[error("generation service returned no text")]
    EmptyResponse,
}

/// Errors produced while turning generated text into an advisory.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AdvisorError {
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),
    /// Generated text had no usable JSON object, or the object broke the
    /// response contract.
    #[error("malformed generation output: {0}")]
    MalformedOutput(String),
    /// A finished result failed the final contract check.
    #[error("result failed validation: {}", .0.join("; "))]
    Validation(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_error_messages() {
        assert_eq!(
            GenerationError::Status {
                status: 503,
                body: "overloaded".into()
            }
            .to_string(),
            "generation service returned HTTP 503: overloaded"
        );
        assert_eq!(
            GenerationError::Timeout(1500).to_string(),
            "generation timed out after 1500 ms"
        );
    }

    #[test]
    fn advisor_error_wraps_generation_error() {
        let err: AdvisorError = GenerationError::Disabled.into();
        assert_eq!(err.to_string(), "generation failed: generation is disabled");
    }

    #[test]
    fn validation_error_lists_problems() {
        let err = AdvisorError::Validation(vec!["summary is empty".into(), "x".into()]);
        assert_eq!(err.to_string(), "result failed validation: summary is empty; x");
    }
}
