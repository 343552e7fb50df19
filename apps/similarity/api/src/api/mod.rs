use axum::Router;
use axum::routing::get;
use axum_helpers::TokenAuth;
use domain_similarity::{SimilarityState, VectorIndex, handlers};

pub mod health;

/// Root banner plus the token-protected domain routes.
pub fn routes(state: &crate::state::AppState, auth: TokenAuth) -> Router {
    handlers::router(state.similarity.clone(), auth)
}

/// Creates a router with the /ready endpoint that checks every domain index.
///
/// This router has state applied and can be merged with the stateless app
/// router from `create_router`.
pub fn ready_router<R: VectorIndex + 'static>(state: SimilarityState<R>) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler::<R>))
        .with_state(state)
}
