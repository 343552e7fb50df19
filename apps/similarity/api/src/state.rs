//! Application state: one content service per domain over a shared Qdrant
//! client and embedding provider.

use std::sync::Arc;

use domain_similarity::{
    ContentService, Domain, EmbeddingBackend, EmbeddingProvider, HttpEmbeddingProvider,
    QdrantIndex, SimilarityState,
};
use eyre::WrapErr;
use tracing::info;

use crate::config::Config;

pub type Index = Arc<QdrantIndex>;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub similarity: SimilarityState<Index>,
}

impl AppState {
    /// Build clients from configuration. No network calls are made here;
    /// both clients connect lazily.
    pub fn build(config: Config) -> eyre::Result<Self> {
        info!(url = %config.qdrant.url, "Configuring Qdrant client");
        let index = Arc::new(
            QdrantIndex::new(&config.qdrant).wrap_err("Failed to configure Qdrant client")?,
        );
        let embedder = build_embedder(&config)?;

        let service = |domain| Arc::new(ContentService::new(domain, index.clone(), embedder.clone()));
        let similarity =
            SimilarityState::new(service(Domain::AutoInsider), service(Domain::EuropeanRailGuide));

        Ok(Self { config, similarity })
    }
}

fn build_embedder(config: &Config) -> eyre::Result<Arc<dyn EmbeddingProvider>> {
    match config.embedding_backend {
        EmbeddingBackend::Http => {
            info!(
                base_url = %config.embedding.base_url,
                model = %config.embedding.model,
                "Using HTTP embedding provider"
            );
            let provider = HttpEmbeddingProvider::new(config.embedding.clone())
                .wrap_err("Failed to configure embedding client")?;
            Ok(Arc::new(provider))
        }
        EmbeddingBackend::Local => local_embedder(config),
    }
}

#[cfg(feature = "local-embeddings")]
fn local_embedder(config: &Config) -> eyre::Result<Arc<dyn EmbeddingProvider>> {
    info!("Loading local embedding model");
    let provider =
        domain_similarity::LocalEmbeddingProvider::new(config.embedding_cache_dir.as_deref())
            .wrap_err("Failed to load local embedding model")?;
    Ok(Arc::new(provider))
}

#[cfg(not(feature = "local-embeddings"))]
fn local_embedder(_config: &Config) -> eyre::Result<Arc<dyn EmbeddingProvider>> {
    Err(eyre::eyre!(
        "EMBEDDING_BACKEND=local requires building with the `local-embeddings` feature"
    ))
}
