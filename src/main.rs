//! Metricdeck binary entrypoint.
//! Boots the Axum HTTP server, wiring routes, shared state, and telemetry.

use std::net::SocketAddr;

use metricdeck::api::{create_router, AppState};
use metricdeck::config::Config;
use metricdeck::telemetry::Telemetry;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("metricdeck=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = Config::from_env();
    let telemetry = Telemetry::init(config.demo_cache_ttl_ms);

    let state = AppState::new(config.clone());
    let router = create_router(state).merge(telemetry.router());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "metricdeck listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
