//! # Snoutiq Matcher (`matcher`)
//!
//! ## Purpose
//!
//! `matcher` sits between the similarity index (`index`) and context
//! assembly. It takes the raw nearest-neighbor candidates for a query and
//! turns them into the final, ordered match list for one subject.
//!
//! ## Ranking steps
//!
//! 1. **Species filter**: entries scoped to another species are dropped.
//!    An unrecognized subject species disables the filter instead of failing.
//! 2. **Threshold**: with [`RankConfig::min_similarity`] set, weak candidates
//!    are dropped.
//! 3. **Severity boost**: raw similarity (clamped at zero) is multiplied by
//!    the [`SeverityBoost`] multiplier for the entry's severity.
//! 4. **Sort**: boosted score descending. Ties with equal raw similarity go
//!    to the more severe entry; all other ties go to the earlier candidate.
//! 5. **Truncate** to `top_k`, or a smaller caller-supplied cap.
//!
//! An empty result is a valid "no matches" outcome.
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use index::ScoredEntry;
//! use knowledge::{KnowledgeEntry, Severity, Species, SpeciesScope};
//! use matcher::{RankConfig, Ranker};
//!
//! let entry = |title: &str, severity, scope| KnowledgeEntry {
//!     symptom_title: title.into(),
//!     description: String::new(),
//!     severity,
//!     species_scope: scope,
//!     home_care_advice: String::new(),
//!     vet_escalation_criteria: String::new(),
//!     service_recommendation: None,
//!     climate_notes: None,
//!     category: "demo".into(),
//! };
//!
//! let candidates = vec![
//!     ScoredEntry { position: 0, entry: Arc::new(entry("Itching", Severity::Routine, SpeciesScope::Both)), score: 0.8 },
//!     ScoredEntry { position: 1, entry: Arc::new(entry("Bleeding", Severity::Emergency, SpeciesScope::Dogs)), score: 0.6 },
//!     ScoredEntry { position: 2, entry: Arc::new(entry("Hairballs", Severity::Routine, SpeciesScope::Cats)), score: 0.9 },
//! ];
//!
//! let ranker = Ranker::new(RankConfig::default()).unwrap();
//! let ranked = ranker.rank(&candidates, Some(Species::Dogs), "dog bleeding");
//!
//! assert_eq!(ranked.len(), 2);
//! assert_eq!(ranked[0].entry.symptom_title, "Bleeding");
//! ```

pub mod engine;
pub mod types;

pub use crate::engine::Ranker;
pub use crate::types::{MatchResult, RankConfig, RankError, SeverityBoost};
