use async_trait::async_trait;

use crate::SemanticError;

/// Maps text to a fixed-length vector.
///
/// Implementations must be deterministic for identical input so that ranking
/// is reproducible, and must report failures as errors rather than returning
/// placeholder vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Label of the underlying model.
    fn model_name(&self) -> &str;

    /// Output length, when known ahead of the first call.
    fn dimension(&self) -> Option<usize>;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, SemanticError>;

    /// Embeds many texts, preserving input order. The default issues one call
    /// per text.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, SemanticError> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}
