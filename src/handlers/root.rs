use axum::response::Json;
use serde_json::{json, Value};

/// GET / - service description
pub async fn get() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "DataSense API",
            "version": version,
            "description": "Natural-language queries and reversible mutations over a SQLite table and a JSON document collection",
            "endpoints": {
                "health": "GET /api/health",
                "schema": "GET /api/schema?db_type=nosql|sql",
                "records": "GET /api/records?db_type=nosql|sql",
                "audit": "GET /api/audit",
                "undo": "POST /api/audit/undo/:id",
                "query": "POST /api/query {prompt, role, mode, db_type}",
            }
        }
    }))
}
