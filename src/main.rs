//! Rate Compare server binary.

use anyhow::Context;
use rate_compare::api::rest::{AppState, create_router};
use rate_compare::application::services::RateAggregationEngine;
use rate_compare::config::Settings;
use rate_compare::infrastructure::providers::ProviderRegistry;
use rate_compare::infrastructure::providers::simulation::RandomSimulation;
use rate_compare::telemetry::init_tracing;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load().context("loading settings")?;
    settings.validate().context("validating settings")?;
    init_tracing(&settings.logging).context("installing tracing subscriber")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        log_format = %settings.logging.format,
        "starting rate-compare"
    );

    let registry =
        ProviderRegistry::from_settings(&settings.providers, Arc::new(RandomSimulation::from_entropy()))
            .context("building provider registry")?;
    let (providers, upstreams) = registry.into_parts();
    let engine = RateAggregationEngine::with_defaults(providers);
    info!(
        providers = ?engine.provider_ids(),
        strategy = engine.strategy_name(),
        "aggregation engine ready"
    );

    let state = Arc::new(AppState::new(
        engine,
        upstreams,
        settings.server.compare_timeout(),
    ));
    let router = create_router(state);

    let address = settings.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;
    info!(address = %address, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => error!(error = %e, "failed to listen for shutdown signal"),
    }
}
