//! Snoutiq embedding service
//!
//! This crate turns symptom text into vectors the similarity index can
//! compare. Everything downstream only sees the [`Embedder`] trait, so the
//! backend is a config switch:
//!
//! - **fast mode** - [`FastEmbedder`], a hashed bag-of-words model. No model
//!   files, no network, bit-for-bit reproducible. Good for tests and for small
//!   corpora where vocabulary overlap carries most of the signal.
//! - **api mode** - [`ApiEmbedder`], which calls a remote provider (Hugging
//!   Face, OpenAI-compatible, or a custom endpoint) behind retry, a circuit
//!   breaker and a token bucket.
//!
//! Either one can sit behind [`CachedEmbedder`]; repeated queries are common
//! enough ("dog vomiting") that the LRU pays for itself quickly.
//!
//! Unlike some embedding setups, there's no silent fallback to fake vectors
//! when the provider is down. An embedding failure is a real error here and
//! the pipeline reports it as such.
//!
//! ## Quick example
//!
//! ```
//! use semantic::{build_embedder, SemanticConfig};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let embedder = build_embedder(&SemanticConfig::default()).unwrap();
//! let v = embedder.embed("dog scratching ears").await.unwrap();
//! assert_eq!(v.len(), 384);
//! # });
//! ```

pub mod config;
pub mod error;
pub mod normalize;
pub mod resilience;
pub mod serde_millis;

mod api;
mod cache;
mod embedder;
mod fast;

use std::num::NonZeroUsize;
use std::sync::Arc;

pub use crate::api::ApiEmbedder;
pub use crate::cache::CachedEmbedder;
pub use crate::config::SemanticConfig;
pub use crate::embedder::Embedder;
pub use crate::error::SemanticError;
pub use crate::fast::FastEmbedder;
pub use crate::normalize::{cosine_similarity, dot, l2_normalize_in_place};

/// Builds the embedder described by `cfg`, wrapped in an LRU cache when
/// `cache_capacity > 0`.
pub fn build_embedder(cfg: &SemanticConfig) -> Result<Arc<dyn Embedder>, SemanticError> {
    cfg.validate()?;

    let base: Arc<dyn Embedder> = match cfg.mode.as_str() {
        "api" => Arc::new(ApiEmbedder::from_config(cfg)?),
        _ => Arc::new(FastEmbedder::from_config(cfg)),
    };

    Ok(match NonZeroUsize::new(cfg.cache_capacity) {
        Some(capacity) => Arc::new(CachedEmbedder::new(base, capacity)),
        None => base,
    })
}
