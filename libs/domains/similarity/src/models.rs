use serde::{Deserialize, Deserializer, Serialize, Serializer, ser::SerializeMap};
use serde_json::Value;
use utoipa::ToSchema;

use crate::error::SimilarityError;

/// Length of every embedding produced or stored.
pub const EMBEDDING_DIMENSION: usize = 384;

/// Maximum records per embed + upsert round trip.
pub const INDEX_BATCH_SIZE: usize = 64;

/// Maximum records handed to `add_to_index` per bulk-load page.
pub const LOAD_PAGE_SIZE: usize = 256;

pub const DEFAULT_LIMIT: u64 = 5;
pub const MAX_LIMIT: u64 = 10;

pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/multi-qa-MiniLM-L6-cos-v1";

/// Effective number of results for a raw `limit` query parameter.
///
/// Anything that is not an integer in `1..=MAX_LIMIT` falls back to
/// `DEFAULT_LIMIT`.
pub fn effective_limit(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|l| (1..=MAX_LIMIT as i64).contains(l))
        .map(|l| l as u64)
        .unwrap_or(DEFAULT_LIMIT)
}

/// A piece of content to index.
///
/// On the wire: `{"ID": "1", "Title": "...", "Context": "..."}`; `ID` may also
/// be a JSON number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Record {
    #[serde(rename = "ID", deserialize_with = "string_or_number")]
    #[schema(example = "1")]
    pub id: String,
    #[serde(rename = "Title")]
    #[schema(example = "Squeaking brakes")]
    pub title: String,
    /// Embedding input, usually title plus the long description.
    #[serde(rename = "Context")]
    pub context: String,
}

impl Record {
    pub fn new(id: impl Into<String>, title: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            context: context.into(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "ID must be a string or number, got {}",
            other
        ))),
    }
}

/// What gets upserted: one per record.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorEntry {
    pub id: String,
    pub embedding: Vec<f32>,
    pub title: String,
}

/// A k-NN hit as returned by the index, before domain shaping.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMatch {
    pub id: String,
    pub score: f32,
    pub title: Option<String>,
}

/// Field names a domain uses for its results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultShape {
    pub id_field: &'static str,
    pub title_field: &'static str,
}

/// One similar record, serialized with its domain's field names
/// (`{"ai_id", "problem_title", "score"}` or `{"erg_id", "place_name", "score"}`).
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityResult {
    pub id: String,
    pub title: String,
    pub score: f32,
    pub shape: ResultShape,
}

impl Serialize for SimilarityResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry(self.shape.id_field, &self.id)?;
        map.serialize_entry(self.shape.title_field, &self.title)?;
        map.serialize_entry("score", &self.score)?;
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    Cosine,
    Euclidean,
    DotProduct,
}

/// Parameters an index is created with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexConfig {
    pub name: String,
    pub dimension: usize,
    pub metric: DistanceMetric,
}

impl IndexConfig {
    /// 384-dim cosine index, the only shape this service creates.
    pub fn standard(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dimension: EMBEDDING_DIMENSION,
            metric: DistanceMetric::Cosine,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct IndexInfo {
    pub name: String,
    pub dimension: usize,
    pub metric: DistanceMetric,
    pub points: u64,
}

pub const NOT_A_LIST_MESSAGE: &str = "Should be a list of vector ids";

/// Ids to delete, validated from an untyped JSON payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VectorIds(pub Vec<String>);

impl VectorIds {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl TryFrom<Value> for VectorIds {
    type Error = SimilarityError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Array(items) = value else {
            return Err(SimilarityError::Validation(NOT_A_LIST_MESSAGE.to_string()));
        };

        items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                Value::Number(n) => Ok(n.to_string()),
                _ => Err(SimilarityError::Validation(NOT_A_LIST_MESSAGE.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(VectorIds)
    }
}

impl From<Vec<String>> for VectorIds {
    fn from(ids: Vec<String>) -> Self {
        VectorIds(ids)
    }
}
