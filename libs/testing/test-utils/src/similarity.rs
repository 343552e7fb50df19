//! In-process wiring for handler tests: both domains share one in-memory
//! index and the deterministic hashing embedder.

use std::sync::Arc;

use domain_similarity::{
    ContentService, Domain, EmbeddingProvider, HashingEmbedder, InMemoryIndex, ServiceResult,
    SimilarityState,
};

pub type TestState = SimilarityState<Arc<InMemoryIndex>>;

/// State whose domain indexes already exist.
pub async fn in_memory_state() -> ServiceResult<TestState> {
    let index = Arc::new(InMemoryIndex::new());
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(HashingEmbedder);

    let service = |domain| Arc::new(ContentService::new(domain, index.clone(), embedder.clone()));
    let state = SimilarityState::new(service(Domain::AutoInsider), service(Domain::EuropeanRailGuide));

    for domain in Domain::ALL {
        state.service(domain).ensure_index().await?;
    }
    Ok(state)
}
