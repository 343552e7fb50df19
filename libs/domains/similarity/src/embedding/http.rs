use std::time::Duration;

use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_optional, env_or_default, env_parse_or};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{EmbeddingProvider, ensure_dimension};
use crate::error::{ServiceResult, SimilarityError};
use crate::models::DEFAULT_EMBEDDING_MODEL;

/// Connection settings for an OpenAI-compatible embeddings endpoint
/// (text-embeddings-inference, vLLM, Ollama, OpenAI itself).
#[derive(Clone)]
pub struct HttpEmbeddingConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

impl HttpEmbeddingConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            timeout_secs: 30,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

impl std::fmt::Debug for HttpEmbeddingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEmbeddingConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl FromEnv for HttpEmbeddingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: env_or_default("EMBEDDING_BASE_URL", "http://localhost:8081/v1"),
            api_key: env_optional("EMBEDDING_API_KEY"),
            model: env_or_default("EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL),
            timeout_secs: env_parse_or("EMBEDDING_TIMEOUT_SECS", 30)?,
        })
    }
}

/// Embeddings over HTTP, `POST {base_url}/embeddings`.
pub struct HttpEmbeddingProvider {
    client: Client,
    config: HttpEmbeddingConfig,
}

impl HttpEmbeddingProvider {
    pub fn new(config: HttpEmbeddingConfig) -> ServiceResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SimilarityError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/embeddings", self.config.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
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

        let request = EmbeddingRequest {
            model: &self.config.model,
            input: texts,
        };

        let mut builder = self.client.post(self.endpoint()).json(&request);
        if let Some(api_key) = &self.config.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SimilarityError::Embedding(format!(
                "embedding endpoint returned {}: {}",
                status, error_text
            )));
        }

        let mut data = response.json::<EmbeddingResponse>().await?.data;
        if data.len() != texts.len() {
            return Err(SimilarityError::Embedding(format!(
                "requested {} embeddings, received {}",
                texts.len(),
                data.len()
            )));
        }

        data.sort_by_key(|d| d.index);
        tracing::debug!(count = data.len(), model = %self.config.model, "Embedded batch");

        data.into_iter()
            .map(|d| ensure_dimension(d.embedding))
            .collect()
    }
}
