//! Exchange offers HTTP server.

use anyhow::Context;
use exchange_offers::api::rest::{AppState, create_router};
use exchange_offers::bootstrap::build_best_offer;
use exchange_offers::config::AppConfig;
use exchange_offers::infrastructure::observability::init_tracing;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    init_tracing(config.log_format).context("installing tracing subscriber")?;
    if let Some(path) = &config.dotenv_path {
        tracing::debug!(path = %path.display(), "loaded .env file");
    }

    let (best_offer, provider_count) =
        build_best_offer(&config).context("building provider clients")?;
    let router = create_router(Arc::new(AppState {
        best_offer,
        provider_count,
    }));

    let address = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;
    tracing::info!(address = %address, providers = provider_count, "exchange offers server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
