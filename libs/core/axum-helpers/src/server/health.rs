use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use core_config::AppInfo;
use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub name: &'static str,
    pub version: &'static str,
}

/// Aggregated readiness: `status` is `ready` only when every check passed.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub checks: BTreeMap<String, &'static str>,
}

impl ReadyResponse {
    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}

impl IntoResponse for ReadyResponse {
    fn into_response(self) -> Response {
        let status = if self.is_ready() {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };
        (status, Json(self)).into_response()
    }
}

/// A boxed future for health checks with a string error
pub type HealthCheckFuture<'a> = Pin<Box<dyn Future<Output = Result<(), String>> + Send + 'a>>;

/// Runs the named checks concurrently.
///
/// Failures are logged with their error and reported as `unavailable`; the
/// error text itself never reaches the response.
///
/// ```ignore
/// let checks: Vec<(String, HealthCheckFuture)> = vec![
///     ("qdrant".into(), Box::pin(async { index.health().await.map_err(|e| e.to_string()) })),
/// ];
/// run_health_checks(checks).await
/// ```
pub async fn run_health_checks(checks: Vec<(String, HealthCheckFuture<'_>)>) -> ReadyResponse {
    let (names, futures): (Vec<_>, Vec<_>) = checks.into_iter().unzip();
    let results = join_all(futures).await;

    let mut all_ok = true;
    let mut statuses = BTreeMap::new();

    for (name, result) in names.into_iter().zip(results) {
        match result {
            Ok(()) => {
                statuses.insert(name, "available");
            }
            Err(e) => {
                tracing::error!("Readiness check failed: {} error: {}", name, e);
                statuses.insert(name, "unavailable");
                all_ok = false;
            }
        }
    }

    ReadyResponse {
        status: if all_ok { "ready" } else { "not ready" },
        checks: statuses,
    }
}

/// Liveness handler: always 200 while the process is serving.
pub async fn health_handler(State(app): State<AppInfo>) -> Response {
    let response = HealthResponse {
        status: "healthy",
        name: app.name,
        version: app.version,
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// Router with the `/health` endpoint.
///
/// ```ignore
/// let app = router.merge(health_router(app_info!()));
/// ```
pub fn health_router(app_info: AppInfo) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(app_info)
}
