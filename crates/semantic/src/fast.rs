use async_trait::async_trait;
use fxhash::hash64;

use crate::normalize::l2_normalize_in_place;
use crate::{Embedder, SemanticConfig, SemanticError};

const WORD_WEIGHT: f32 = 1.0;
const TRIGRAM_WEIGHT: f32 = 0.5;

/// Deterministic local embedder.
///
/// Hashes lowercase words and their padded character trigrams into signed
/// buckets (the "hashing trick"), then L2-normalizes. Texts sharing words or
/// word stems ("vomit" / "vomiting") land close together; unrelated texts
/// are near-orthogonal. No model files, no network, identical output on every
/// platform.
#[derive(Debug, Clone)]
pub struct FastEmbedder {
    model_name: String,
    dimension: usize,
    normalize: bool,
}

impl FastEmbedder {
    pub fn new(dimension: usize) -> Self {
        let dimension = dimension.max(1);
        Self {
            model_name: format!("hashed-bow-{dimension}"),
            dimension,
            normalize: true,
        }
    }

    pub fn from_config(cfg: &SemanticConfig) -> Self {
        Self {
            model_name: format!("hashed-bow-{}", cfg.tier_dimension()),
            dimension: cfg.tier_dimension(),
            normalize: cfg.normalize,
        }
    }

    fn add_feature(&self, vector: &mut [f32], feature: &[u8], weight: f32) {
        let h = hash64(feature);
        let bucket = (h % self.dimension as u64) as usize;
        let sign = if h >> 63 == 1 { -1.0 } else { 1.0 };
        vector[bucket] += sign * weight;
    }

    /// Synchronous core, exposed for benchmarks and batch builds.
    pub fn embed_sync(&self, text: &str) -> Result<Vec<f32>, SemanticError> {
        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        if words.is_empty() {
            return Err(SemanticError::EmptyInput);
        }

        let mut vector = vec![0f32; self.dimension];
        for word in &words {
            self.add_feature(&mut vector, word.as_bytes(), WORD_WEIGHT);

            let padded: Vec<char> = std::iter::once('#')
                .chain(word.chars())
                .chain(std::iter::once('#'))
                .collect();
            let mut buf = String::with_capacity(12);
            for window in padded.windows(3) {
                buf.clear();
                buf.push('~');
                buf.extend(window);
                self.add_feature(&mut vector, buf.as_bytes(), TRIGRAM_WEIGHT);
            }
        }

        if self.normalize {
            l2_normalize_in_place(&mut vector);
        }
        Ok(vector)
    }
}

#[async_trait]
impl Embedder for FastEmbedder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.dimension)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, SemanticError> {
        self.embed_sync(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{dot, l2_norm};

    #[test]
    fn zero_dimension_is_clamped_in_name_too() {
        let embedder = FastEmbedder::new(0);
        assert_eq!(embedder.dimension(), Some(1));
        assert_eq!(embedder.model_name(), "hashed-bow-1");
        assert_eq!(embedder.embed_sync("cough").unwrap().len(), 1);
    }

    #[test]
    fn dimension_follows_tier() {
        let cfg = SemanticConfig::default().with_tier("balanced");
        let embedder = FastEmbedder::from_config(&cfg);
        assert_eq!(embedder.dimension(), Some(768));
        assert_eq!(embedder.embed_sync("hello").unwrap().len(), 768);
    }

    #[test]
    fn output_is_unit_length_and_deterministic() {
        let embedder = FastEmbedder::new(384);
        let a = embedder.embed_sync("Dog vomiting after meals").unwrap();
        let b = embedder.embed_sync("Dog vomiting after meals").unwrap();
        assert_eq!(a, b);
        assert!((l2_norm(&a) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn case_and_punctuation_do_not_matter() {
        let embedder = FastEmbedder::new(384);
        let a = embedder.embed_sync("VOMITING, blood!").unwrap();
        let b = embedder.embed_sync("vomiting blood").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn related_texts_score_higher_than_unrelated() {
        let embedder = FastEmbedder::new(384);
        let query = embedder.embed_sync("my dog keeps vomiting").unwrap();
        let related = embedder.embed_sync("Vomiting. Repeated vomiting in dogs").unwrap();
        let unrelated = embedder.embed_sync("Ear mites. Cats scratching ears").unwrap();
        assert!(dot(&query, &related) > dot(&query, &unrelated));
        assert!(dot(&query, &related) > 0.3);
    }

    #[test]
    fn empty_or_symbol_only_text_is_rejected() {
        let embedder = FastEmbedder::new(16);
        assert_eq!(embedder.embed_sync("   "), Err(SemanticError::EmptyInput));
        assert_eq!(embedder.embed_sync("?!"), Err(SemanticError::EmptyInput));
    }

    #[tokio::test]
    async fn batch_preserves_order() {
        let embedder = FastEmbedder::new(64);
        let texts = vec!["cough".to_string(), "limp".to_string()];
        let batch = embedder.embed_batch(&texts).await.unwrap();
        assert_eq!(batch[0], embedder.embed("cough").await.unwrap());
        assert_eq!(batch[1], embedder.embed("limp").await.unwrap());
    }
}
