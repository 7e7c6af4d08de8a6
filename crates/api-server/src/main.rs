//! Reference server for the TaskApp tasks API
//!
//! Serves the `/tasks` REST contract the client talks to, backed by a JSON
//! file. Meant for local development and end-to-end checks.

mod routes;
mod state;
mod store;

use anyhow::Context;
use axum::Router;
use std::net::SocketAddr;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::state::AppState;

const DEFAULT_PORT: u16 = 3000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskapp_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let data_dir = std::env::var("TASKAPP_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(".taskapp-data"));
    let api_key = std::env::var("TASKAPP_API_KEY")
        .ok()
        .filter(|key| !key.is_empty())
        .context("TASKAPP_API_KEY must be set")?;
    let port = match std::env::var("TASKAPP_PORT") {
        Ok(port) => port
            .parse()
            .with_context(|| format!("Invalid TASKAPP_PORT: {}", port))?,
        Err(_) => DEFAULT_PORT,
    };

    tracing::info!("Using data directory: {:?}", data_dir);

    let app_state = AppState::new(data_dir, api_key)
        .await
        .context("Failed to initialize application state")?;

    let app = Router::new()
        .merge(routes::health::router())
        .merge(routes::tasks::router(app_state.clone()))
        .with_state(app_state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Tasks API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
