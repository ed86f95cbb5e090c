use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lru::LruCache;

use crate::{Embedder, SemanticError};

/// LRU cache in front of another embedder, keyed by exact input text.
///
/// Only successful results are cached. The lock is never held across the
/// inner call, so concurrent misses on the same text may both reach the
/// inner embedder; the second insert simply overwrites the first with an
/// identical vector.
pub struct CachedEmbedder {
    inner: Arc<dyn Embedder>,
    cache: Mutex<LruCache<String, Vec<f32>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CachedEmbedder {
    pub fn new(inner: Arc<dyn Embedder>, capacity: NonZeroUsize) -> Self {
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    fn lookup(&self, text: &str) -> Option<Vec<f32>> {
        let mut cache = self.cache.lock().unwrap_or_else(|p| p.into_inner());
        cache.get(text).cloned()
    }

    fn store(&self, text: &str, vector: &[f32]) {
        let mut cache = self.cache.lock().unwrap_or_else(|p| p.into_inner());
        cache.put(text.to_string(), vector.to_vec());
    }
}

#[async_trait]
impl Embedder for CachedEmbedder {
    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    fn dimension(&self) -> Option<usize> {
        self.inner.dimension()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, SemanticError> {
        if let Some(hit) = self.lookup(text) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(hit);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let vector = self.inner.embed(text).await?;
        self.store(text, &vector);
        Ok(vector)
    }

    /// Corpus builds go straight to the inner embedder so a large reload does
    /// not evict the query working set.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, SemanticError> {
        self.inner.embed_batch(texts).await
    }
}
