mod artifacts;
mod chat;
mod config;
mod db;
mod errors;
mod models;
mod profile;
mod routes;
mod state;
mod store;
#[cfg(test)]
mod testing;
mod workflow;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::postgres::{ensure_schema, PgChatStore, PgProfileStore};
use crate::workflow::DifyClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("hedge_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Hedge API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL and the document tables
    let pool = create_pool(&config.database_url).await?;
    ensure_schema(&pool).await?;

    // Initialize the workflow collaborator client
    let workflow = DifyClient::new(config.workflow_url.clone(), config.chatflow_url.clone());
    info!("Workflow client initialized");

    // Build app state
    let state = AppState {
        store: Arc::new(PgProfileStore::new(pool.clone())),
        chat_store: Arc::new(PgChatStore::new(pool)),
        workflow: Arc::new(workflow),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
