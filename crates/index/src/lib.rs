//! # Snoutiq Index
//!
//! In-memory corpus store and similarity index for knowledge entries.
//!
//! ## Core Features
//!
//! - **Immutable store**: a [`CorpusStore`] is built once from validated
//!   entries and their embeddings and never changes afterwards. Entries keep
//!   their insertion order, which doubles as the tie-break order for search.
//! - **Cosine search**: embeddings are L2-normalized into a dense
//!   `ndarray` matrix at build time, so a search is one matrix-vector product
//!   followed by a stable top-K selection.
//! - **Atomic reload**: [`CorpusHandle`] publishes whole stores. Readers take
//!   an `Arc` snapshot and keep using it until they finish, even if a reload
//!   swaps in a new store meanwhile.
//!
//! An empty store is legal to build but every search on it fails with
//! [`IndexError::EmptyCorpus`], so callers can tell "nothing loaded" apart
//! from "nothing relevant".
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use index::{CorpusHandle, CorpusStore};
//! use knowledge::{KnowledgeEntry, Severity, SpeciesScope};
//!
//! let entry = KnowledgeEntry {
//!     symptom_title: "Vomiting".into(),
//!     description: "Repeated vomiting".into(),
//!     severity: Severity::Urgent,
//!     species_scope: SpeciesScope::Dogs,
//!     home_care_advice: String::new(),
//!     vet_escalation_criteria: String::new(),
//!     service_recommendation: None,
//!     climate_notes: None,
//!     category: "digestive".into(),
//! };
//!
//! let store = CorpusStore::build(vec![entry], vec![vec![1.0, 0.0]]).unwrap();
//! let handle = CorpusHandle::new(store);
//!
//! let hits = handle.snapshot().search(&[0.6, 0.8], 5).unwrap();
//! assert_eq!(hits.len(), 1);
//! assert!((hits[0].score - 0.6).abs() < 1e-6);
//! ```

mod handle;
mod query;

use std::sync::Arc;

use knowledge::KnowledgeEntry;
use ndarray::Array2;
use semantic::{l2_normalize_in_place, Embedder, SemanticError};
use thiserror::Error;
use tracing::info;

pub use crate::handle::CorpusHandle;
pub use crate::query::ScoredEntry;

/// Custom error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    #[error("corpus is empty; no knowledge entries are loaded")]
    EmptyCorpus,
    #[error("entry {position} has an empty embedding")]
    EmptyEmbedding { position: usize },
    #[error("entry {position} has a zero-norm embedding")]
    DegenerateEmbedding { position: usize },
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("{entries} entries but {embeddings} embeddings")]
    LengthMismatch { entries: usize, embeddings: usize },
    #[error("embedding failed: {0}")]
    Embedding(#[from] SemanticError),
}

/// Knowledge entries paired with their normalized embeddings.
///
/// Row `i` of the matrix is the embedding of `entries[i]`.
#[derive(Debug, Clone)]
pub struct CorpusStore {
    entries: Vec<Arc<KnowledgeEntry>>,
    matrix: Array2<f32>,
}

impl CorpusStore {
    /// A store with no entries. Searching it yields [`IndexError::EmptyCorpus`].
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            matrix: Array2::zeros((0, 0)),
        }
    }

    /// Pairs entries with precomputed embeddings.
    ///
    /// Every embedding must be non-empty, non-zero, and share one dimension.
    /// Nothing is padded or truncated to make a bad vector fit.
    pub fn build(
        entries: Vec<KnowledgeEntry>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Self, IndexError> {
        if entries.len() != embeddings.len() {
            return Err(IndexError::LengthMismatch {
                entries: entries.len(),
                embeddings: embeddings.len(),
            });
        }
        if entries.is_empty() {
            return Ok(Self::empty());
        }

        let dim = embeddings[0].len();
        let mut flat = Vec::with_capacity(entries.len() * dim);
        for (position, mut vector) in embeddings.into_iter().enumerate() {
            if vector.is_empty() {
                return Err(IndexError::EmptyEmbedding { position });
            }
            if vector.len() != dim {
                return Err(IndexError::DimensionMismatch {
                    expected: dim,
                    actual: vector.len(),
                });
            }
            if vector.iter().all(|x| *x == 0.0) {
                return Err(IndexError::DegenerateEmbedding { position });
            }
            l2_normalize_in_place(&mut vector);
            flat.extend(vector);
        }

        let matrix = Array2::from_shape_vec((entries.len(), dim), flat).map_err(|_| {
            IndexError::DimensionMismatch {
                expected: dim,
                actual: 0,
            }
        })?;

        Ok(Self {
            entries: entries.into_iter().map(Arc::new).collect(),
            matrix,
        })
    }

    /// Embeds every entry's title and description with `embedder`, then
    /// builds the store. Any embedding failure aborts the whole build.
    pub async fn embed_and_build(
        entries: Vec<KnowledgeEntry>,
        embedder: &dyn Embedder,
    ) -> Result<Self, IndexError> {
        let texts: Vec<String> = entries.iter().map(KnowledgeEntry::embedding_text).collect();
        let embeddings = embedder.embed_batch(&texts).await?;
        let store = Self::build(entries, embeddings)?;
        info!(
            entries = store.len(),
            dimension = store.dimension(),
            model = embedder.model_name(),
            "corpus_built"
        );
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embedding dimension, or 0 for an empty store.
    pub fn dimension(&self) -> usize {
        self.matrix.ncols()
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[Arc<KnowledgeEntry>] {
        &self.entries
    }

    /// Entry counts per category, in first-seen order.
    pub fn categories(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for entry in &self.entries {
            match counts.iter_mut().find(|(name, _)| *name == entry.category) {
                Some((_, n)) => *n += 1,
                None => counts.push((entry.category.clone(), 1)),
            }
        }
        counts
    }
}

impl Default for CorpusStore {
    fn default() -> Self {
        Self::empty()
    }
}
