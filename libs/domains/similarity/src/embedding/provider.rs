use async_trait::async_trait;

use crate::error::ServiceResult;

/// Turns text into fixed-length vectors.
///
/// Implementations return exactly one `EMBEDDING_DIMENSION`-long vector per
/// input, in input order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate the embedding for a single text
    async fn embed(&self, text: &str) -> ServiceResult<Vec<f32>>;

    /// Generate embeddings for multiple texts in one call
    async fn embed_batch(&self, texts: &[String]) -> ServiceResult<Vec<Vec<f32>>>;
}
