use std::sync::Arc;

use knowledge::{KnowledgeEntry, Severity};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Score multipliers keyed by entry severity.
///
/// The defaults (1.5 / 1.2 / 1.0) are fixed policy constants. They are
/// configurable so deployments can reproduce older behavior, not so they can
/// be tuned per request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SeverityBoost {
    #[serde(default = "SeverityBoost::default_emergency")]
    pub emergency: f32,
    #[serde(default = "SeverityBoost::default_urgent")]
    pub urgent: f32,
    #[serde(default = "SeverityBoost::default_routine")]
    pub routine: f32,
}

impl SeverityBoost {
    pub(crate) fn default_emergency() -> f32 {
        1.5
    }

    pub(crate) fn default_urgent() -> f32 {
        1.2
    }

    pub(crate) fn default_routine() -> f32 {
        1.0
    }

    pub fn multiplier(&self, severity: Severity) -> f32 {
        match severity {
            Severity::Emergency => self.emergency,
            Severity::Urgent => self.urgent,
            Severity::Routine => self.routine,
        }
    }
}

impl Default for SeverityBoost {
    fn default() -> Self {
        Self {
            emergency: Self::default_emergency(),
            urgent: Self::default_urgent(),
            routine: Self::default_routine(),
        }
    }
}

/// Ranking policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankConfig {
    /// Maximum number of matches returned (N).
    #[serde(default = "RankConfig::default_top_k")]
    pub top_k: usize,
    /// Candidates requested from the index are `ceil(top_k * oversample_factor)`,
    /// leaving room for species filtering to drop some.
    #[serde(default = "RankConfig::default_oversample_factor")]
    pub oversample_factor: f32,
    /// Raw similarity below this is dropped before boosting. Unset means no cut.
    #[serde(default)]
    pub min_similarity: Option<f32>,
    #[serde(default)]
    pub boost: SeverityBoost,
}

impl RankConfig {
    pub(crate) fn default_top_k() -> usize {
        10
    }

    pub(crate) fn default_oversample_factor() -> f32 {
        2.0
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_oversample_factor(mut self, factor: f32) -> Self {
        self.oversample_factor = factor;
        self
    }

    pub fn with_min_similarity(mut self, min: f32) -> Self {
        self.min_similarity = Some(min);
        self
    }

    pub fn with_boost(mut self, boost: SeverityBoost) -> Self {
        self.boost = boost;
        self
    }

    /// How many candidates to pull from the similarity index.
    pub fn candidate_count(&self) -> usize {
        ((self.top_k as f32) * self.oversample_factor).ceil() as usize
    }

    pub fn validate(&self) -> Result<(), RankError> {
        if self.top_k == 0 {
            return Err(RankError::InvalidConfig(
                "top_k must be greater than zero".into(),
            ));
        }
        if !(self.oversample_factor >= 1.0) {
            return Err(RankError::InvalidConfig(
                "oversample_factor must be >= 1.0".into(),
            ));
        }
        if let Some(min) = self.min_similarity {
            if !(-1.0..=1.0).contains(&min) {
                return Err(RankError::InvalidConfig(
                    "min_similarity must be between -1.0 and 1.0".into(),
                ));
            }
        }
        for (name, value) in [
            ("emergency", self.boost.emergency),
            ("urgent", self.boost.urgent),
            ("routine", self.boost.routine),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(RankError::InvalidConfig(format!(
                    "boost.{name} must be a positive number"
                )));
            }
        }
        Ok(())
    }
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            top_k: Self::default_top_k(),
            oversample_factor: Self::default_oversample_factor(),
            min_similarity: None,
            boost: SeverityBoost::default(),
        }
    }
}

/// A ranked match. Lives for one request.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub entry: Arc<KnowledgeEntry>,
    /// Cosine similarity as reported by the index.
    pub raw_similarity: f32,
    pub boosted_score: f32,
    pub severity_multiplier: f32,
    /// Zero-based position in the candidate list before boosting.
    pub candidate_rank: usize,
}

/// Errors produced by the ranking layer.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RankError {
    #[error("invalid rank config: {0}")]
    InvalidConfig(String),
}
