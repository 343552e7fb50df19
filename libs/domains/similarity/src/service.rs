use std::sync::Arc;

use tracing::instrument;

use crate::domain::Domain;
use crate::embedding::EmbeddingProvider;
use crate::error::{ServiceResult, SimilarityError};
use crate::index::VectorIndex;
use crate::models::{
    INDEX_BATCH_SIZE, IndexConfig, IndexInfo, Record, SimilarityResult, VectorEntry, VectorIds,
};

/// Per-domain orchestration of embedding and vector index calls.
pub struct ContentService<R: VectorIndex> {
    domain: Domain,
    index: R,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl<R: VectorIndex> ContentService<R> {
    pub fn new(domain: Domain, index: R, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            domain,
            index,
            embedder,
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    fn index_name(&self) -> &'static str {
        self.domain.index_name()
    }

    /// Top `limit` records most similar to `query_text`, in index ranking order.
    #[instrument(skip(self, query_text), fields(domain = %self.domain))]
    pub async fn get_similar_for(
        &self,
        query_text: &str,
        limit: u64,
    ) -> ServiceResult<Vec<SimilarityResult>> {
        let vector = self.embedder.embed(query_text).await?;
        let matches = self.index.query(self.index_name(), vector, limit).await?;

        tracing::debug!(matches = matches.len(), "Similarity query completed");
        Ok(matches
            .iter()
            .map(|m| self.domain.transform_result(m))
            .collect())
    }

    /// Embed and upsert `records` in chunks of `INDEX_BATCH_SIZE`.
    ///
    /// Returns the number of records processed. Stops at the first failing
    /// chunk; earlier chunks stay written.
    #[instrument(skip(self, records), fields(domain = %self.domain, records = records.len()))]
    pub async fn add_to_index(&self, records: &[Record]) -> ServiceResult<usize> {
        let mut processed = 0;

        for chunk in records.chunks(INDEX_BATCH_SIZE) {
            let contexts: Vec<String> = chunk.iter().map(|r| r.context.clone()).collect();
            let embeddings = self.embedder.embed_batch(&contexts).await?;

            if embeddings.len() != chunk.len() {
                return Err(SimilarityError::Embedding(format!(
                    "requested {} embeddings, received {}",
                    chunk.len(),
                    embeddings.len()
                )));
            }

            let entries: Vec<VectorEntry> = chunk
                .iter()
                .zip(embeddings)
                .map(|(record, embedding)| VectorEntry {
                    id: record.id.clone(),
                    embedding,
                    title: record.title.clone(),
                })
                .collect();

            self.index.upsert(self.index_name(), entries).await?;
            processed += chunk.len();
            tracing::debug!(batch = chunk.len(), processed, "Upserted batch");
        }

        tracing::info!(processed, "Added records to index");
        Ok(processed)
    }

    /// Delete entries by record id. Unknown ids are ignored by the index.
    #[instrument(skip(self, ids), fields(domain = %self.domain, ids = ids.len()))]
    pub async fn delete_from_index(&self, ids: VectorIds) -> ServiceResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let count = ids.len();
        self.index.delete(self.index_name(), ids.into_inner()).await?;
        tracing::info!(count, "Deleted records from index");
        Ok(count)
    }

    /// Drop the domain index if present and recreate it empty (384, cosine).
    #[instrument(skip(self), fields(domain = %self.domain))]
    pub async fn rebuild_index(&self) -> ServiceResult<()> {
        let name = self.index_name();

        if self.index.index_exists(name).await? {
            tracing::info!(index = name, "Deleting existing index");
            self.index.delete_index(name).await?;
        }

        self.index.create_index(&IndexConfig::standard(name)).await?;
        tracing::info!(index = name, "Index rebuilt");
        Ok(())
    }

    /// Create the domain index unless it already exists. Returns whether it
    /// was created.
    #[instrument(skip(self), fields(domain = %self.domain))]
    pub async fn ensure_index(&self) -> ServiceResult<bool> {
        let name = self.index_name();

        if self.index.index_exists(name).await? {
            tracing::debug!(index = name, "Index already present");
            return Ok(false);
        }

        self.index.create_index(&IndexConfig::standard(name)).await?;
        tracing::info!(index = name, "Index created");
        Ok(true)
    }

    pub async fn index_info(&self) -> ServiceResult<Option<IndexInfo>> {
        self.index.describe_index(self.index_name()).await
    }
}
