use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimilarityError {
    #[error("{0}")]
    Validation(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector index error: {0}")]
    Index(String),

    #[error("Record source error: {0}")]
    Source(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, SimilarityError>;

impl SimilarityError {
    /// True for failures of an external dependency (embedding model,
    /// vector index, database).
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            SimilarityError::Embedding(_) | SimilarityError::Index(_) | SimilarityError::Source(_)
        )
    }
}

impl From<qdrant_client::QdrantError> for SimilarityError {
    fn from(err: qdrant_client::QdrantError) -> Self {
        SimilarityError::Index(err.to_string())
    }
}

impl From<reqwest::Error> for SimilarityError {
    fn from(err: reqwest::Error) -> Self {
        SimilarityError::Embedding(err.to_string())
    }
}

impl From<sqlx::Error> for SimilarityError {
    fn from(err: sqlx::Error) -> Self {
        SimilarityError::Source(err.to_string())
    }
}

impl From<serde_json::Error> for SimilarityError {
    fn from(err: serde_json::Error) -> Self {
        SimilarityError::Internal(format!("JSON error: {}", err))
    }
}

impl From<core_config::ConfigError> for SimilarityError {
    fn from(err: core_config::ConfigError) -> Self {
        SimilarityError::Config(err.to_string())
    }
}

/// Upstream failures become 503 and everything unexpected 500; `AppError`
/// logs the detail and hides it from the client.
impl From<SimilarityError> for AppError {
    fn from(err: SimilarityError) -> Self {
        match err {
            SimilarityError::Validation(msg) => AppError::BadRequest(msg),
            SimilarityError::Embedding(_) | SimilarityError::Index(_) | SimilarityError::Source(_) => {
                AppError::ServiceUnavailable(err.to_string())
            }
            SimilarityError::Config(_) | SimilarityError::Internal(_) => {
                AppError::InternalServerError(err.to_string())
            }
        }
    }
}

impl IntoResponse for SimilarityError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (SimilarityError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (SimilarityError::Embedding("down".into()), StatusCode::SERVICE_UNAVAILABLE),
            (SimilarityError::Index("down".into()), StatusCode::SERVICE_UNAVAILABLE),
            (SimilarityError::Source("down".into()), StatusCode::SERVICE_UNAVAILABLE),
            (SimilarityError::Config("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (SimilarityError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_validation_message_is_verbatim() {
        let err = SimilarityError::Validation("Client error: No query provided".into());
        assert_eq!(err.to_string(), "Client error: No query provided");
    }

    #[test]
    fn test_is_upstream() {
        assert!(SimilarityError::Index("x".into()).is_upstream());
        assert!(!SimilarityError::Validation("x".into()).is_upstream());
    }
}
