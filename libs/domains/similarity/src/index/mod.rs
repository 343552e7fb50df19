mod memory;
mod qdrant;

pub use memory::InMemoryIndex;
pub use qdrant::{QdrantConfig, QdrantIndex};

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ServiceResult;
use crate::models::{IndexConfig, IndexInfo, RawMatch, VectorEntry};

/// Storage and k-NN queries over named vector indexes.
///
/// Entries are keyed by record id; upserting an existing id replaces it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorIndex: Send + Sync {
    // ===== Index Management =====

    async fn index_exists(&self, name: &str) -> ServiceResult<bool>;

    async fn create_index(&self, config: &IndexConfig) -> ServiceResult<()>;

    async fn delete_index(&self, name: &str) -> ServiceResult<()>;

    /// `None` when the index does not exist
    async fn describe_index(&self, name: &str) -> ServiceResult<Option<IndexInfo>>;

    // ===== Entry Operations =====

    async fn upsert(&self, index: &str, entries: Vec<VectorEntry>) -> ServiceResult<()>;

    /// Top `top_k` entries by similarity, best first, with titles.
    async fn query(&self, index: &str, vector: Vec<f32>, top_k: u64)
    -> ServiceResult<Vec<RawMatch>>;

    async fn delete(&self, index: &str, ids: Vec<String>) -> ServiceResult<()>;
}

#[async_trait]
impl<T: VectorIndex + ?Sized> VectorIndex for Arc<T> {
    async fn index_exists(&self, name: &str) -> ServiceResult<bool> {
        (**self).index_exists(name).await
    }

    async fn create_index(&self, config: &IndexConfig) -> ServiceResult<()> {
        (**self).create_index(config).await
    }

    async fn delete_index(&self, name: &str) -> ServiceResult<()> {
        (**self).delete_index(name).await
    }

    async fn describe_index(&self, name: &str) -> ServiceResult<Option<IndexInfo>> {
        (**self).describe_index(name).await
    }

    async fn upsert(&self, index: &str, entries: Vec<VectorEntry>) -> ServiceResult<()> {
        (**self).upsert(index, entries).await
    }

    async fn query(
        &self,
        index: &str,
        vector: Vec<f32>,
        top_k: u64,
    ) -> ServiceResult<Vec<RawMatch>> {
        (**self).query(index, vector, top_k).await
    }

    async fn delete(&self, index: &str, ids: Vec<String>) -> ServiceResult<()> {
        (**self).delete(index, ids).await
    }
}
