use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::VectorIndex;
use crate::error::{ServiceResult, SimilarityError};
use crate::models::{DistanceMetric, IndexConfig, IndexInfo, RawMatch, VectorEntry};

struct StoredIndex {
    config: IndexConfig,
    entries: HashMap<String, (Vec<f32>, String)>,
}

/// Process-local vector index with exact cosine search.
///
/// Mirrors the Qdrant behaviour the service relies on: writes to a missing
/// index fail, re-upserting an id replaces it, deleting unknown ids is a
/// no-op.
#[derive(Default)]
pub struct InMemoryIndex {
    indexes: RwLock<HashMap<String, StoredIndex>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

fn missing(name: &str) -> SimilarityError {
    SimilarityError::Index(format!("index '{}' does not exist", name))
}

fn similarity(metric: DistanceMetric, a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    match metric {
        DistanceMetric::DotProduct => dot,
        DistanceMetric::Cosine => {
            let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
            let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm_a == 0.0 || norm_b == 0.0 {
                0.0
            } else {
                dot / (norm_a * norm_b)
            }
        }
        DistanceMetric::Euclidean => {
            -a.iter()
                .zip(b)
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f32>()
                .sqrt()
        }
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn index_exists(&self, name: &str) -> ServiceResult<bool> {
        Ok(self.indexes.read().await.contains_key(name))
    }

    async fn create_index(&self, config: &IndexConfig) -> ServiceResult<()> {
        let mut indexes = self.indexes.write().await;
        if indexes.contains_key(&config.name) {
            return Err(SimilarityError::Index(format!(
                "index '{}' already exists",
                config.name
            )));
        }
        indexes.insert(
            config.name.clone(),
            StoredIndex {
                config: config.clone(),
                entries: HashMap::new(),
            },
        );
        Ok(())
    }

    async fn delete_index(&self, name: &str) -> ServiceResult<()> {
        self.indexes.write().await.remove(name);
        Ok(())
    }

    async fn describe_index(&self, name: &str) -> ServiceResult<Option<IndexInfo>> {
        Ok(self.indexes.read().await.get(name).map(|stored| IndexInfo {
            name: stored.config.name.clone(),
            dimension: stored.config.dimension,
            metric: stored.config.metric,
            points: stored.entries.len() as u64,
        }))
    }

    async fn upsert(&self, index: &str, entries: Vec<VectorEntry>) -> ServiceResult<()> {
        let mut indexes = self.indexes.write().await;
        let stored = indexes.get_mut(index).ok_or_else(|| missing(index))?;

        if let Some(bad) = entries
            .iter()
            .find(|e| e.embedding.len() != stored.config.dimension)
        {
            return Err(SimilarityError::Index(format!(
                "vector for '{}' has {} dimensions, index expects {}",
                bad.id,
                bad.embedding.len(),
                stored.config.dimension
            )));
        }

        for entry in entries {
            stored
                .entries
                .insert(entry.id, (entry.embedding, entry.title));
        }
        Ok(())
    }

    async fn query(
        &self,
        index: &str,
        vector: Vec<f32>,
        top_k: u64,
    ) -> ServiceResult<Vec<RawMatch>> {
        let indexes = self.indexes.read().await;
        let stored = indexes.get(index).ok_or_else(|| missing(index))?;

        let mut matches: Vec<RawMatch> = stored
            .entries
            .iter()
            .map(|(id, (embedding, title))| RawMatch {
                id: id.clone(),
                score: similarity(stored.config.metric, &vector, embedding),
                title: Some(title.clone()),
            })
            .collect();

        matches.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        matches.truncate(top_k as usize);
        Ok(matches)
    }

    async fn delete(&self, index: &str, ids: Vec<String>) -> ServiceResult<()> {
        let mut indexes = self.indexes.write().await;
        let stored = indexes.get_mut(index).ok_or_else(|| missing(index))?;
        for id in ids {
            stored.entries.remove(&id);
        }
        Ok(())
    }
}
