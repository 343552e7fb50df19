//! Subcommand implementations.

use axum_helpers::TokenAuth;
use axum_helpers::server::{create_production_app, create_router, health_router};
use domain_similarity::{BulkLoader, Domain, LoadOptions, MySqlRecordSource};
use eyre::WrapErr;
use tracing::info;

use crate::config::{Config, api_token, mysql_config};
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Run the HTTP server until SIGINT/SIGTERM.
pub async fn serve(config: Config, ensure_indexes: bool) -> eyre::Result<()> {
    let auth = TokenAuth::new(api_token()?);
    let state = AppState::build(config)?;

    if ensure_indexes {
        for domain in Domain::ALL {
            let created = state
                .similarity
                .service(domain)
                .ensure_index()
                .await
                .wrap_err_with(|| format!("Failed to ensure index for {}", domain))?;
            info!(%domain, created, "Index ready");
        }
    }

    let api_routes = crate::api::routes(&state, auth);

    // create_router adds docs/middleware to our composed routes
    let router = create_router::<ApiDoc>(api_routes, &state.config.server)?;

    // - /health: liveness with app name/version
    // - /ready: every domain index exists and answers
    let app = router
        .merge(health_router(state.config.app))
        .merge(crate::api::ready_router(state.similarity.clone()));

    info!(
        "Starting similarity API (shutdown timeout {:?})",
        state.config.server.shutdown_timeout
    );

    create_production_app(app, &state.config.server, async {
        // Clients hold no pooled resources that need an explicit close.
        info!("Shutting down: draining in-flight requests");
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Similarity API shutdown complete");
    Ok(())
}

/// Copy every exportable MySQL row of `domain` into its index.
pub async fn index_from_mysql(config: Config, domain: Domain, rebuild: bool) -> eyre::Result<()> {
    let state = AppState::build(config)?;
    let service = state.similarity.service(domain).clone();

    if !rebuild {
        service.ensure_index().await?;
    }

    let source = MySqlRecordSource::connect(&mysql_config(domain)?, domain)
        .await
        .wrap_err("Failed to connect to MySQL")?;

    let loader = BulkLoader::new(source, service);
    let result = loader.run(LoadOptions { rebuild }).await;
    loader.source().close().await;

    let report = result.wrap_err_with(|| format!("Bulk load for {} failed", domain))?;
    info!(
        %domain,
        fetched = report.fetched,
        indexed = report.indexed,
        pages = report.pages,
        "Bulk load finished"
    );
    Ok(())
}

/// Drop and recreate a domain index, leaving it empty.
pub async fn rebuild_index(config: Config, domain: Domain) -> eyre::Result<()> {
    let state = AppState::build(config)?;
    state.similarity.service(domain).rebuild_index().await?;
    info!(%domain, index = domain.index_name(), "Index rebuilt");
    Ok(())
}
