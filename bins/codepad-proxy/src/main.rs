mod handlers;
mod routes;

use anyhow::Context;
use axum::Router;
use codepad_common::config::Config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub http: reqwest::Client,
    pub upstream_url: String,
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new().merge(routes::routes()).with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
        )
        .with_target(false)
        .init();

    info!("Codepad proxy booting...");

    let config = Config::from_env();
    info!("Relaying compile requests to: {}", config.upstream_url);

    let state = Arc::new(AppState {
        http: reqwest::Client::new(),
        upstream_url: config.upstream_url.clone(),
    });

    let listener = TcpListener::bind(&config.proxy_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.proxy_addr))?;

    info!("HTTP server listening on {}", config.proxy_addr);

    axum::serve(listener, app(state))
        .await
        .context("Server error")?;

    Ok(())
}
