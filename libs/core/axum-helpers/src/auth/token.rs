use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderName},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::errors::AppError;

/// Header carrying the shared API secret.
pub const ACCESS_TOKEN_HEADER: HeaderName = HeaderName::from_static("x-access-token");

pub const MISSING_TOKEN_MESSAGE: &str = "Client error: A valid token is missing!";
pub const INVALID_TOKEN_MESSAGE: &str = "Client error: Your token is invalid!";

/// Shared-secret authentication: the request header must equal the
/// configured token exactly.
#[derive(Clone)]
pub struct TokenAuth {
    token: Arc<str>,
}

impl TokenAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Arc::from(token.into()),
        }
    }

    /// Validate the token header.
    ///
    /// Absent or empty → `MissingToken` (400); any other mismatch,
    /// including non-ASCII values → `Unauthorized` (401).
    pub fn check(&self, headers: &HeaderMap) -> Result<(), AppError> {
        let Some(value) = headers.get(&ACCESS_TOKEN_HEADER) else {
            return Err(AppError::MissingToken(MISSING_TOKEN_MESSAGE.to_string()));
        };

        if value.is_empty() {
            return Err(AppError::MissingToken(MISSING_TOKEN_MESSAGE.to_string()));
        }

        match value.to_str() {
            Ok(provided) if provided == &*self.token => Ok(()),
            _ => Err(AppError::Unauthorized(INVALID_TOKEN_MESSAGE.to_string())),
        }
    }
}

impl std::fmt::Debug for TokenAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuth")
            .field("token", &"***")
            .finish()
    }
}

/// Token authentication middleware
///
/// ```ignore
/// let protected = Router::new()
///     .route("/store", post(store))
///     .layer(axum::middleware::from_fn_with_state(
///         TokenAuth::new(api_token),
///         require_token,
///     ));
/// ```
pub async fn require_token(
    State(auth): State<TokenAuth>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Err(e) = auth.check(request.headers()) {
        tracing::debug!(path = %request.uri().path(), "Token check failed: {}", e);
        return Err(e);
    }

    Ok(next.run(request).await)
}
