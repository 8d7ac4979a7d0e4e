// handlers/mod.rs - HTTP surface over the query engine
//
// One file per endpoint. Every handler that touches the stores goes through
// the engine lock, so requests run one at a time.
pub mod audit_get;
pub mod audit_undo;
pub mod health;
pub mod query_post;
pub mod records_get;
pub mod root;
pub mod schema_get;

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ApiConfig;
use crate::engine::QueryEngine;
use crate::types::DbType;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Mutex<QueryEngine>>,
}

impl AppState {
    pub fn new(engine: QueryEngine) -> Self {
        Self { engine: Arc::new(Mutex::new(engine)) }
    }
}

/// `?db_type=` selector shared by the schema and records endpoints
#[derive(Debug, Default, Deserialize)]
pub struct DbTypeQuery {
    #[serde(default)]
    pub db_type: DbType,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root::get))
        .route("/api/health", get(health::get))
        .route("/api/schema", get(schema_get::get))
        .route("/api/records", get(records_get::get))
        .route("/api/audit", get(audit_get::get))
        .route("/api/audit/undo/:id", post(audit_undo::post))
        .route("/api/query", post(query_post::post))
        .with_state(state)
}

/// Router with the global middleware layers the server runs with
pub fn app(state: AppState, api: &ApiConfig) -> Router {
    let mut app = router(state).layer(cors_layer(&api.cors_origins));
    if api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }
    app
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", o);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}
