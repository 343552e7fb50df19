//! Readiness check against the vector index.

use axum::extract::State;
use axum_helpers::server::{HealthCheckFuture, ReadyResponse, run_health_checks};
use domain_similarity::{Domain, SimilarityState, VectorIndex};

/// Each domain index must exist and answer a describe call.
pub async fn ready_handler<R: VectorIndex>(
    State(state): State<SimilarityState<R>>,
) -> ReadyResponse {
    let checks: Vec<(String, HealthCheckFuture<'_>)> = Domain::ALL
        .into_iter()
        .map(|domain| {
            let service = state.service(domain);
            let check: HealthCheckFuture<'_> = Box::pin(async move {
                match service.index_info().await {
                    Ok(Some(_)) => Ok(()),
                    Ok(None) => Err(format!("index '{}' does not exist", domain.index_name())),
                    Err(e) => Err(e.to_string()),
                }
            });
            (domain.index_name().to_string(), check)
        })
        .collect();

    run_health_checks(checks).await
}
