mod hashing;
mod http;
#[cfg(feature = "local-embeddings")]
mod local;
mod provider;

pub use hashing::HashingEmbedder;
pub use http::{HttpEmbeddingConfig, HttpEmbeddingProvider};
#[cfg(feature = "local-embeddings")]
pub use local::LocalEmbeddingProvider;
pub use provider::EmbeddingProvider;

#[cfg(test)]
pub use provider::MockEmbeddingProvider;

use std::str::FromStr;

use crate::error::{ServiceResult, SimilarityError};
use crate::models::EMBEDDING_DIMENSION;

/// Which embedding implementation the service runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbeddingBackend {
    /// OpenAI-compatible `/embeddings` endpoint.
    #[default]
    Http,
    /// In-process model (requires the `local-embeddings` feature).
    Local,
}

impl FromStr for EmbeddingBackend {
    type Err = SimilarityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" | "openai" => Ok(EmbeddingBackend::Http),
            "local" | "fastembed" => Ok(EmbeddingBackend::Local),
            other => Err(SimilarityError::Config(format!(
                "Unknown embedding backend '{}', expected http or local",
                other
            ))),
        }
    }
}

/// Reject vectors that do not match the index dimensionality.
pub(crate) fn ensure_dimension(embedding: Vec<f32>) -> ServiceResult<Vec<f32>> {
    if embedding.len() != EMBEDDING_DIMENSION {
        return Err(SimilarityError::Embedding(format!(
            "expected {} dimensions, got {}",
            EMBEDDING_DIMENSION,
            embedding.len()
        )));
    }
    Ok(embedding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_dimension() {
        assert!(ensure_dimension(vec![0.0; EMBEDDING_DIMENSION]).is_ok());
        assert!(matches!(
            ensure_dimension(vec![0.0; 768]),
            Err(SimilarityError::Embedding(_))
        ));
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("HTTP".parse::<EmbeddingBackend>().unwrap(), EmbeddingBackend::Http);
        assert_eq!("local".parse::<EmbeddingBackend>().unwrap(), EmbeddingBackend::Local);
        assert!("gpu".parse::<EmbeddingBackend>().is_err());
    }
}
