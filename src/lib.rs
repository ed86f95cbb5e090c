//! Workspace umbrella crate for Snoutiq, a veterinary symptom triage
//! pipeline.
//!
//! A pet parent's free-text description goes through six stages:
//!
//! 1. **expand**: [`QueryExpander`] appends clinical synonyms
//! 2. **detect**: [`EmergencyDetector`] flags critical keywords
//! 3. **embed**: an [`Embedder`] turns the expanded text into a vector,
//!    under a timeout
//! 4. **search**: the current [`CorpusStore`] snapshot returns the closest
//!    knowledge entries
//! 5. **rank**: [`Ranker`] filters by species, boosts by severity and
//!    truncates
//! 6. **respond**: [`Responder`] generates advice, or falls back to a
//!    deterministic answer, and validates the result
//!
//! [`Pipeline`] owns all of it. Build one per process, load a corpus, and
//! share it.
//!
//! ```
//! use std::sync::Arc;
//! use snoutiq::{DisabledGenerator, Pipeline, PipelineConfig, Severity, SubjectProfile};
//! use snoutiq::{build_embedder, load_entries_from_slice};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let config = PipelineConfig::default();
//! let embedder = build_embedder(&config.semantic).unwrap();
//! let pipeline = Pipeline::with_services(&config, embedder, Arc::new(DisabledGenerator)).unwrap();
//!
//! let json = br#"[{"symptom": "Vomiting", "description": "Repeated vomiting",
//!                  "severity": "urgent", "species": "dogs"}]"#;
//! let batch = load_entries_from_slice("digestive", "inline", json).unwrap();
//! pipeline.load_entries(batch.entries).await.unwrap();
//!
//! let pet = SubjectProfile::new("Bruno", "dog");
//! let result = pipeline.analyze(&pet, "dog vomiting blood").await.unwrap();
//! assert!(result.query_metadata.is_emergency);
//! assert_eq!(result.urgency_level, Severity::Emergency);
//! # });
//! ```

mod config;
mod error;
mod metrics;
mod pipeline;

pub use crate::config::{ConfigLoadError, PipelineConfig, TimeoutConfig};
pub use crate::error::PipelineError;
pub use crate::metrics::PipelineMetrics;
pub use crate::pipeline::{CorpusSummary, Pipeline};

pub use advisor::{
    build_generator, Advice, AnalysisResult, Advisory, Confidence, ContextConfig,
    DisabledGenerator, FallbackReason, GeminiClient, GenerationConfig, GenerationError,
    GenerationService, QueryMetadata, Responder, ResponseSource,
};
pub use index::{CorpusHandle, CorpusStore, IndexError, ScoredEntry};
pub use knowledge::{
    load_dataset_dir, load_entries_from_slice, KnowledgeEntry, KnowledgeError, LoadReport,
    ServiceRecommendation, Severity, Species, SpeciesScope, SubjectProfile,
};
pub use matcher::{MatchResult, RankConfig, Ranker, SeverityBoost};
pub use query::{EmergencyDetector, QueryExpander};
pub use semantic::{build_embedder, Embedder, SemanticConfig, SemanticError};
