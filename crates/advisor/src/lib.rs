//! Advisory generation for ranked symptom matches.
//!
//! The flow for one request:
//!
//! 1. [`ContextAssembler`] renders up to three matches and the pet profile
//!    into a bounded text block. Missing profile fields say "Not provided".
//! 2. [`build_prompt`] wraps that block with the role preamble, the emergency
//!    status and the exact JSON schema expected back.
//! 3. A [`GenerationService`] ([`GeminiClient`] in production) answers under
//!    a timeout.
//! 4. [`parse_advice`] pulls the first well-formed JSON object out of the
//!    reply and maps it onto closed enums, rejecting anything off-contract.
//! 5. [`validate_result`] gates the finished [`AnalysisResult`].
//!
//! Any failure in steps 3-5 lands in [`FallbackSynthesizer`], which builds a
//! low-confidence answer from the best match without calling out. So
//! [`Responder::respond`] has no error type at all; the caller always gets a
//! validated result, and an emergency flag always shows up as `emergency`
//! urgency.
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use advisor::{ContextConfig, DisabledGenerator, Responder};
//! use knowledge::{Severity, SubjectProfile};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
//! let responder = Responder::new(
//!     Arc::new(DisabledGenerator),
//!     ContextConfig::default(),
//!     Duration::from_secs(5),
//! );
//! let pet = SubjectProfile::new("Bruno", "dog");
//! let advisory = responder.respond(&pet, "dog is bleeding from paw", &[], true).await;
//! assert_eq!(advisory.result.urgency_level, Severity::Emergency);
//! assert!(advisory.result.is_fallback());
//! # });
//! ```

mod context;
mod error;
mod fallback;
mod generation;
mod parse;
mod prompt;
mod responder;
mod types;
mod validate;

pub use crate::context::{AssembledContext, ContextAssembler, ContextConfig};
pub use crate::error::{AdvisorError, GenerationError};
pub use crate::fallback::{FallbackSynthesizer, CONSULT_STEP, EMERGENCY_STEP};
pub use crate::generation::{
    build_generator, DisabledGenerator, GeminiClient, GenerationConfig, GenerationService,
};
pub use crate::parse::{extract_first_json_object, parse_advice};
pub use crate::prompt::build_prompt;
pub use crate::responder::{Advisory, FallbackReason, Responder};
pub use crate::types::{Advice, AnalysisResult, Confidence, QueryMetadata, ResponseSource};
pub use crate::validate::validate_result;
