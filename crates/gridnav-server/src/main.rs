//! gridnav server - route planning over HTTP

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gridnav_server::{build_app, config::Config, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gridnav_server=debug".parse()?)
                .add_directive("gridnav_core=info".parse()?),
        )
        .init();

    tracing::info!("Starting gridnav server...");

    let config = Config::from_env();
    let port = config.server_port;
    tracing::info!(
        max_expansions = ?config.max_expansions,
        time_limit_ms = ?config.time_limit_ms,
        max_grid_cells = ?config.max_grid_cells,
        "planner limits"
    );
    let state = Arc::new(AppState::new(config));
    let app = build_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
