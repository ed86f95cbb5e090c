use std::cmp::Ordering;
use std::sync::Arc;

use knowledge::KnowledgeEntry;
use ndarray::ArrayView1;
use semantic::normalize::l2_norm;

use crate::{CorpusStore, IndexError};

/// One search hit: the entry, its position in the corpus, and its raw cosine
/// similarity to the query.
#[derive(Debug, Clone)]
pub struct ScoredEntry {
    pub position: usize,
    pub entry: Arc<KnowledgeEntry>,
    pub score: f32,
}

impl CorpusStore {
    /// Top-`k` entries by cosine similarity, highest first. Equal scores keep
    /// corpus insertion order.
    ///
    /// A zero query vector scores every entry 0.0, so the result is simply
    /// the first `k` entries.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredEntry>, IndexError> {
        if self.is_empty() {
            return Err(IndexError::EmptyCorpus);
        }
        if query.len() != self.dimension() {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension(),
                actual: query.len(),
            });
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let norm = l2_norm(query);
        let scale = if norm > 0.0 { norm.recip() } else { 0.0 };
        let scores = self.matrix.dot(&ArrayView1::from(query));

        let mut ranked: Vec<(usize, f32)> = scores
            .iter()
            .enumerate()
            .map(|(i, s)| (i, s * scale))
            .collect();
        ranked.sort_by(|a, b| match b.1.total_cmp(&a.1) {
            Ordering::Equal => a.0.cmp(&b.0),
            other => other,
        });
        ranked.truncate(k);

        Ok(ranked
            .into_iter()
            .map(|(position, score)| ScoredEntry {
                position,
                entry: Arc::clone(&self.entries[position]),
                score,
            })
            .collect())
    }
}
