use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use datasense_api::audit::AuditLog;
use datasense_api::config;
use datasense_api::database::{DocumentStore, RelationalStore, StoreSet};
use datasense_api::engine::QueryEngine;
use datasense_api::generation::LlmClient;
use datasense_api::handlers::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up STORAGE_*, GENERATION_*, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting DataSense API in {:?} mode", config.environment);

    let storage = &config.storage;
    let documents = DocumentStore::open(&storage.document_path, storage.seed_on_create)
        .await
        .context("opening document store")?;
    let relational = RelationalStore::open(&storage.sqlite_path, storage.seed_on_create)
        .await
        .context("opening SQLite store")?;

    let generator = LlmClient::new(&config.generation).context("building generator client")?;
    let engine = QueryEngine::new(
        StoreSet::new(documents, relational),
        Arc::new(generator),
        AuditLog::new(config.audit.side_file.clone()),
    )
    .with_insights(config.generation.enable_insights);

    let app = handlers::app(AppState::new(engine), &config.api);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("DataSense API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server")?;
    Ok(())
}
