use axum::http::{HeaderValue, Method, header::InvalidHeaderValue};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::auth::ACCESS_TOKEN_HEADER;

/// Creates a CORS layer for the given origins.
///
/// - Methods: GET, POST, OPTIONS
/// - Headers: Content-Type, Accept, X-ACCESS-TOKEN
/// - Max age: 1 hour
///
/// Fails if any origin is not a valid header value.
pub fn create_cors_layer<S: AsRef<str>>(origins: &[S]) -> Result<CorsLayer, InvalidHeaderValue> {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .map(|origin| origin.as_ref().parse::<HeaderValue>())
        .collect::<Result<_, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
            ACCESS_TOKEN_HEADER,
        ])
        .max_age(Duration::from_secs(3600)))
}
