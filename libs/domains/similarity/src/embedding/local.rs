//! In-process embeddings with fastembed.
//!
//! `fastembed::TextEmbedding` is neither `Send` nor `Sync`, so the model sits
//! behind `Arc<Mutex<_>>` and every call runs on the blocking pool.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{EmbeddingProvider, ensure_dimension};
use crate::error::{ServiceResult, SimilarityError};

/// `all-MiniLM-L6-v2`, the 384-dim sentence-transformers family.
pub struct LocalEmbeddingProvider {
    model: Arc<Mutex<fastembed::TextEmbedding>>,
}

impl LocalEmbeddingProvider {
    /// Load the model, downloading it into `cache_dir` on first use.
    pub fn new(cache_dir: Option<&str>) -> ServiceResult<Self> {
        let mut init = fastembed::InitOptions::new(fastembed::EmbeddingModel::AllMiniLML6V2);
        if let Some(path) = cache_dir {
            init = init.with_cache_dir(std::path::PathBuf::from(path));
        }

        let model = fastembed::TextEmbedding::try_new(init).map_err(|e| {
            SimilarityError::Config(format!("Failed to initialize fastembed model: {}", e))
        })?;

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
        })
    }
}

impl std::fmt::Debug for LocalEmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalEmbeddingProvider")
            .field("model", &"all-minilm-l6-v2")
            .finish()
    }
}

#[async_trait]
impl EmbeddingProvider for LocalEmbeddingProvider {
    async fn embed(&self, text: &str) -> ServiceResult<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SimilarityError::Embedding("No embedding returned".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> ServiceResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let model = self.model.clone();
        let texts = texts.to_vec();

        let embeddings = tokio::task::spawn_blocking(move || {
            let mut model = model
                .lock()
                .map_err(|e| SimilarityError::Internal(format!("Mutex poisoned: {}", e)))?;
            model
                .embed(texts, None)
                .map_err(|e| SimilarityError::Embedding(format!("Batch embedding failed: {}", e)))
        })
        .await
        .map_err(|e| SimilarityError::Internal(format!("spawn_blocking failed: {}", e)))??;

        embeddings.into_iter().map(ensure_dimension).collect()
    }
}
