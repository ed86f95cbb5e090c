use std::sync::Arc;
use std::time::Duration;

use knowledge::{ServiceRecommendation, Severity, SubjectProfile};
use matcher::MatchResult;
use tracing::{debug, error, warn};

use crate::context::{ContextAssembler, ContextConfig};
use crate::fallback::FallbackSynthesizer;
use crate::generation::GenerationService;
use crate::parse::parse_advice;
use crate::prompt::build_prompt;
use crate::types::{Advice, AnalysisResult, Confidence, QueryMetadata, ResponseSource};
use crate::validate::validate_result;
use crate::{AdvisorError, GenerationError};

/// Why an advisory came from the fallback path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    Disabled,
    Timeout,
    ServiceError,
    MalformedOutput,
    ValidationFailed,
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackReason::Disabled => "disabled",
            FallbackReason::Timeout => "timeout",
            FallbackReason::ServiceError => "service_error",
            FallbackReason::MalformedOutput => "malformed_output",
            FallbackReason::ValidationFailed => "validation_failed",
        }
    }
}

/// A validated result plus how it was produced.
#[derive(Debug, Clone)]
pub struct Advisory {
    pub result: AnalysisResult,
    pub fallback_reason: Option<FallbackReason>,
}

/// Generative responder with a guaranteed-safe fallback.
///
/// [`Responder::respond`] never fails: generation errors, timeouts,
/// unparseable output and contract violations all end in the fallback
/// synthesizer, and the returned result has always passed validation.
pub struct Responder {
    generator: Arc<dyn GenerationService>,
    assembler: ContextAssembler,
    fallback: FallbackSynthesizer,
    timeout: Duration,
}

impl Responder {
    pub fn new(
        generator: Arc<dyn GenerationService>,
        context: ContextConfig,
        timeout: Duration,
    ) -> Self {
        Self {
            generator,
            assembler: ContextAssembler::new(context),
            fallback: FallbackSynthesizer,
            timeout,
        }
    }

    pub fn generator(&self) -> &dyn GenerationService {
        self.generator.as_ref()
    }

    pub async fn respond(
        &self,
        profile: &SubjectProfile,
        query: &str,
        matches: &[MatchResult],
        is_emergency: bool,
    ) -> Advisory {
        let pet_name = match profile.name.trim() {
            "" => "Your pet",
            name => name,
        };
        let top_score = matches
            .first()
            .map(|m| m.boosted_score)
            .filter(|s| s.is_finite())
            .unwrap_or(0.0)
            .max(0.0);
        let metadata = |source| QueryMetadata::now(matches.len(), is_emergency, top_score, source);

        let generated = match self.generate(profile, query, matches, is_emergency).await {
            Ok(advice) => advice,
            Err(reason) => {
                let advice = self.fallback.synthesize(matches, is_emergency);
                return self.finish_fallback(
                    pet_name,
                    advice,
                    metadata(ResponseSource::Fallback),
                    reason,
                    matches,
                    is_emergency,
                );
            }
        };

        let result =
            AnalysisResult::from_advice(pet_name, generated, metadata(ResponseSource::Generated));
        match validate_result(&result) {
            Ok(()) => {
                debug!(
                    urgency = %result.urgency_level,
                    confidence = %result.confidence,
                    "advisory_generated"
                );
                Advisory {
                    result,
                    fallback_reason: None,
                }
            }
            Err(err) => {
                warn!(error = %err, "generated_result_rejected");
                let advice = self.fallback.synthesize(matches, is_emergency);
                self.finish_fallback(
                    pet_name,
                    advice,
                    metadata(ResponseSource::Fallback),
                    FallbackReason::ValidationFailed,
                    matches,
                    is_emergency,
                )
            }
        }
    }

    /// Runs generation and parsing. The emergency flag overrides whatever
    /// urgency the generator chose, and an answer with no supporting match
    /// is never more than `low` confidence.
    async fn generate(
        &self,
        profile: &SubjectProfile,
        query: &str,
        matches: &[MatchResult],
        is_emergency: bool,
    ) -> Result<Advice, FallbackReason> {
        let context = self.assembler.assemble(matches, profile, is_emergency);
        let prompt = build_prompt(&context, query);

        let text = match tokio::time::timeout(self.timeout, self.generator.generate(&prompt)).await
        {
            Err(_) => {
                let err = GenerationError::Timeout(self.timeout.as_millis() as u64);
                warn!(error = %err, model = self.generator.model_name(), "generation_fallback");
                return Err(FallbackReason::Timeout);
            }
            Ok(Err(GenerationError::Disabled)) => {
                debug!("generation_disabled");
                return Err(FallbackReason::Disabled);
            }
            Ok(Err(err)) => {
                warn!(error = %err, model = self.generator.model_name(), "generation_fallback");
                return Err(FallbackReason::ServiceError);
            }
            Ok(Ok(text)) => text,
        };

        let mut advice = parse_advice(&text).map_err(|err: AdvisorError| {
            warn!(error = %err, "generation_fallback");
            FallbackReason::MalformedOutput
        })?;

        if is_emergency {
            advice.urgency_level = Severity::Emergency;
            advice.service_recommendation = ServiceRecommendation::InClinic;
        }
        if matches.is_empty() {
            advice.confidence = Confidence::Low;
        }
        Ok(advice)
    }

    fn finish_fallback(
        &self,
        pet_name: &str,
        advice: Advice,
        metadata: QueryMetadata,
        reason: FallbackReason,
        matches: &[MatchResult],
        is_emergency: bool,
    ) -> Advisory {
        let result = AnalysisResult::from_advice(pet_name, advice, metadata.clone());
        let result = match validate_result(&result) {
            Ok(()) => result,
            Err(err) => {
                error!(error = %err, matches = matches.len(), "fallback_result_rejected");
                AnalysisResult::from_advice(
                    pet_name,
                    self.fallback.synthesize(&[], is_emergency),
                    metadata,
                )
            }
        };
        Advisory {
            result,
            fallback_reason: Some(reason),
        }
    }
}
