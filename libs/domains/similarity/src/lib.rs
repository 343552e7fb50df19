//! Similarity Domain
//!
//! Text similarity search over two content domains (AutoInsider problems and
//! European Rail Guide places), each backed by its own vector index.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐      ┌─────────────┐
//! │  Handlers   │      │ BulkLoader  │  ← HTTP endpoints / MySQL import
//! └──────┬──────┘      └──────┬──────┘
//!        │                    │
//! ┌──────▼────────────────────▼──────┐
//! │          ContentService          │  ← One per domain
//! └──────┬────────────────────┬──────┘
//!        │                    │
//! ┌──────▼──────┐      ┌──────▼──────┐
//! │  Embedding  │      │ VectorIndex │  ← Traits + implementations
//! └─────────────┘      └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use axum_helpers::TokenAuth;
//! use domain_similarity::{
//!     ContentService, Domain, HashingEmbedder, InMemoryIndex, handlers,
//! };
//!
//! let index = Arc::new(InMemoryIndex::new());
//! let embedder = Arc::new(HashingEmbedder);
//! let state = handlers::SimilarityState::new(
//!     Arc::new(ContentService::new(Domain::AutoInsider, index.clone(), embedder.clone())),
//!     Arc::new(ContentService::new(Domain::EuropeanRailGuide, index, embedder)),
//! );
//!
//! let router = handlers::router(state, TokenAuth::new("secret"));
//! ```

pub mod domain;
pub mod embedding;
pub mod error;
pub mod handlers;
pub mod index;
pub mod loader;
pub mod models;
pub mod service;
pub mod source;

// Re-export commonly used types
pub use domain::Domain;
pub use embedding::{
    EmbeddingBackend, EmbeddingProvider, HashingEmbedder, HttpEmbeddingConfig,
    HttpEmbeddingProvider,
};
#[cfg(feature = "local-embeddings")]
pub use embedding::LocalEmbeddingProvider;
pub use error::{ServiceResult, SimilarityError};
pub use handlers::{ApiDoc, SimilarityState};
pub use index::{InMemoryIndex, QdrantConfig, QdrantIndex, VectorIndex};
pub use loader::{BulkLoader, LoadOptions, LoadReport};
pub use models::{
    DistanceMetric, IndexConfig, IndexInfo, Record, SimilarityResult, VectorIds,
};
pub use service::ContentService;
pub use source::{MySqlRecordSource, RecordSource};
