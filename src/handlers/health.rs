use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use super::AppState;
use crate::database::RecordStore;

/// GET /api/health - store locations and reachability
pub async fn get(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let engine = state.engine.lock().await;
    let stores = engine.stores();

    let nosql = stores.documents.location();
    let sql = stores.relational.location();
    let checks = [
        stores.documents.describe().await.err(),
        stores.relational.describe().await.err(),
    ];

    match checks.iter().flatten().next() {
        None => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "nosql": nosql, "sql": sql }
            })),
        ),
        Some(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "store unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "nosql": nosql,
                    "sql": sql,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
