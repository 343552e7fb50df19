use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_optional, env_or_default, env_parse_or};
use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    self, CreateCollectionBuilder, DeletePointsBuilder, Distance, PointId, PointStruct,
    SearchPointsBuilder, UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use uuid::Uuid;

use super::VectorIndex;
use crate::error::{ServiceResult, SimilarityError};
use crate::models::{DistanceMetric, IndexConfig, IndexInfo, RawMatch, VectorEntry};

const RECORD_ID_KEY: &str = "record_id";
const TITLE_KEY: &str = "title";

/// Qdrant connection configuration
#[derive(Clone)]
pub struct QdrantConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for QdrantConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl FromEnv for QdrantConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env_or_default("QDRANT_URL", "http://localhost:6334"),
            api_key: env_optional("QDRANT_API_KEY"),
            timeout_secs: env_parse_or("QDRANT_TIMEOUT_SECS", 30)?,
        })
    }
}

/// Qdrant-backed implementation of VectorIndex.
///
/// Qdrant point ids must be integers or UUIDs, so each record id is mapped to
/// a UUIDv5 of `"{index}/{record id}"`; the record id itself travels in the
/// payload under `record_id`.
pub struct QdrantIndex {
    client: Qdrant,
}

impl QdrantIndex {
    pub fn new(config: &QdrantConfig) -> ServiceResult<Self> {
        let mut builder = Qdrant::from_url(&config.url);

        if let Some(api_key) = &config.api_key {
            builder = builder.api_key(api_key.clone());
        }

        let client = builder
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SimilarityError::Index(format!("Failed to build client: {}", e)))?;

        Ok(Self { client })
    }

    fn to_qdrant_distance(metric: DistanceMetric) -> Distance {
        match metric {
            DistanceMetric::Cosine => Distance::Cosine,
            DistanceMetric::Euclidean => Distance::Euclid,
            DistanceMetric::DotProduct => Distance::Dot,
        }
    }

    fn from_qdrant_distance(distance: Distance) -> DistanceMetric {
        match distance {
            Distance::Euclid => DistanceMetric::Euclidean,
            Distance::Dot => DistanceMetric::DotProduct,
            _ => DistanceMetric::Cosine,
        }
    }

    fn extract_params(config: &Option<qdrant::CollectionConfig>) -> (usize, DistanceMetric) {
        let params = config
            .as_ref()
            .and_then(|c| c.params.as_ref())
            .and_then(|p| p.vectors_config.as_ref())
            .and_then(|vc| vc.config.as_ref());

        match params {
            Some(qdrant::vectors_config::Config::Params(p)) => {
                (p.size as usize, Self::from_qdrant_distance(p.distance()))
            }
            Some(qdrant::vectors_config::Config::ParamsMap(map)) => map
                .map
                .values()
                .next()
                .map(|p| (p.size as usize, Self::from_qdrant_distance(p.distance())))
                .unwrap_or((0, DistanceMetric::Cosine)),
            None => (0, DistanceMetric::Cosine),
        }
    }
}

/// Stable point id for a record within an index.
pub(crate) fn point_id(index: &str, record_id: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("{}/{}", index, record_id).as_bytes())
}

fn entry_payload(entry: &VectorEntry) -> HashMap<String, QdrantValue> {
    HashMap::from([
        (RECORD_ID_KEY.to_string(), QdrantValue::from(entry.id.clone())),
        (TITLE_KEY.to_string(), QdrantValue::from(entry.title.clone())),
    ])
}

fn payload_string(payload: &HashMap<String, QdrantValue>, key: &str) -> Option<String> {
    use qdrant::value::Kind;

    match payload.get(key).and_then(|v| v.kind.as_ref()) {
        Some(Kind::StringValue(s)) => Some(s.clone()),
        Some(Kind::IntegerValue(i)) => Some(i.to_string()),
        _ => None,
    }
}

fn point_id_string(id: &Option<PointId>) -> Option<String> {
    match id.as_ref()?.point_id_options.as_ref()? {
        qdrant::point_id::PointIdOptions::Uuid(uuid) => Some(uuid.clone()),
        qdrant::point_id::PointIdOptions::Num(num) => Some(num.to_string()),
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn index_exists(&self, name: &str) -> ServiceResult<bool> {
        Ok(self.client.collection_exists(name).await?)
    }

    async fn create_index(&self, config: &IndexConfig) -> ServiceResult<()> {
        let builder = CreateCollectionBuilder::new(&config.name).vectors_config(
            VectorParamsBuilder::new(
                config.dimension as u64,
                Self::to_qdrant_distance(config.metric),
            ),
        );

        self.client.create_collection(builder).await?;
        tracing::info!(index = %config.name, dimension = config.dimension, "Created collection");
        Ok(())
    }

    async fn delete_index(&self, name: &str) -> ServiceResult<()> {
        self.client.delete_collection(name).await?;
        tracing::info!(index = %name, "Deleted collection");
        Ok(())
    }

    async fn describe_index(&self, name: &str) -> ServiceResult<Option<IndexInfo>> {
        if !self.client.collection_exists(name).await? {
            return Ok(None);
        }

        let info = self
            .client
            .collection_info(name)
            .await?
            .result
            .ok_or_else(|| SimilarityError::Index("Collection info missing result".to_string()))?;

        let (dimension, metric) = Self::extract_params(&info.config);

        Ok(Some(IndexInfo {
            name: name.to_string(),
            dimension,
            metric,
            points: info.points_count.unwrap_or(0),
        }))
    }

    async fn upsert(&self, index: &str, entries: Vec<VectorEntry>) -> ServiceResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let points: Vec<PointStruct> = entries
            .into_iter()
            .map(|entry| {
                let payload = entry_payload(&entry);
                PointStruct::new(
                    point_id(index, &entry.id).to_string(),
                    entry.embedding,
                    payload,
                )
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(index, points).wait(true))
            .await?;
        Ok(())
    }

    async fn query(
        &self,
        index: &str,
        vector: Vec<f32>,
        top_k: u64,
    ) -> ServiceResult<Vec<RawMatch>> {
        let builder = SearchPointsBuilder::new(index, vector, top_k).with_payload(true);
        let response = self.client.search_points(builder).await?;

        response
            .result
            .into_iter()
            .map(|point| {
                let id = payload_string(&point.payload, RECORD_ID_KEY)
                    .or_else(|| point_id_string(&point.id))
                    .ok_or_else(|| SimilarityError::Index("Missing point ID".to_string()))?;

                Ok(RawMatch {
                    id,
                    score: point.score,
                    title: payload_string(&point.payload, TITLE_KEY),
                })
            })
            .collect()
    }

    async fn delete(&self, index: &str, ids: Vec<String>) -> ServiceResult<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let point_ids: Vec<PointId> = ids
            .iter()
            .map(|id| PointId::from(point_id(index, id).to_string()))
            .collect();

        self.client
            .delete_points(DeletePointsBuilder::new(index).points(point_ids).wait(true))
            .await?;
        Ok(())
    }
}
