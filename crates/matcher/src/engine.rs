use std::cmp::Ordering;
use std::sync::Arc;

use index::ScoredEntry;
use knowledge::Species;
use tracing::debug;

use crate::types::{MatchResult, RankConfig, RankError};


/// Re-ranks similarity candidates for one subject.
#[derive(Debug, Clone)]
pub struct Ranker {
    config: RankConfig,
}

impl Ranker {
    pub fn new(config: RankConfig) -> Result<Self, RankError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RankConfig {
        &self.config
    }

    /// Ranks `candidates` and keeps up to `top_k` matches.
    pub fn rank(
        &self,
        candidates: &[ScoredEntry],
        species: Option<Species>,
        query: &str,
    ) -> Vec<MatchResult> {
        self.rank_top(candidates, species, query, self.config.top_k)
    }

    /// Like [`Ranker::rank`] with a caller-chosen cap, clamped to `top_k`.
    ///
    /// `candidates` must be in index order; that order is the final
    /// tie-break. An empty result is a valid outcome, not an error.
    pub fn rank_top(
        &self,
        candidates: &[ScoredEntry],
        species: Option<Species>,
        query: &str,
        limit: usize,
    ) -> Vec<MatchResult> {
        let limit = limit.min(self.config.top_k);

        let mut matches: Vec<MatchResult> = candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| c.entry.species_scope.admits(species))
            .filter(|(_, c)| {
                self.config
                    .min_similarity
                    .is_none_or(|min| c.score >= min)
            })
            .map(|(candidate_rank, c)| {
                let multiplier = self.config.boost.multiplier(c.entry.severity);
                MatchResult {
                    entry: Arc::clone(&c.entry),
                    raw_similarity: c.score,
                    boosted_score: c.score.max(0.0) * multiplier,
                    severity_multiplier: multiplier,
                    candidate_rank,
                }
            })
            .collect();

        let retained = matches.len();
        matches.sort_by(compare_matches);
        matches.truncate(limit);

        debug!(
            query,
            species = species.map(|s| s.as_str()),
            candidates = candidates.len(),
            retained,
            returned = matches.len(),
            top_score = matches.first().map(|m| m.boosted_score),
            "rank_complete"
        );

        matches
    }
}

/// Boosted score descending. Severity only separates entries whose raw
/// similarity is also equal; otherwise the earlier candidate wins.
fn compare_matches(a: &MatchResult, b: &MatchResult) -> Ordering {
    b.boosted_score
        .total_cmp(&a.boosted_score)
        .then_with(|| {
            if a.raw_similarity.total_cmp(&b.raw_similarity) == Ordering::Equal {
                b.entry.severity.cmp(&a.entry.severity)
            } else {
                Ordering::Equal
            }
        })
        .then_with(|| a.candidate_rank.cmp(&b.candidate_rank))
}
