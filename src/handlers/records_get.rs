use axum::extract::{rejection::QueryRejection, Query, State};
use serde_json::Value;

use super::{AppState, DbTypeQuery};
use crate::database::RecordStore;
use crate::executor::DOCUMENT_IDENTITY_KEY;
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::DbType;

/// GET /api/records - every record in the selected store
pub async fn get(
    State(state): State<AppState>,
    query: Result<Query<DbTypeQuery>, QueryRejection>,
) -> ApiResult<Vec<Value>> {
    let Query(query) = query?;
    let engine = state.engine.lock().await;
    let rows = engine.stores().get(query.db_type).all().await?;

    let identity_key = match query.db_type {
        DbType::Nosql => DOCUMENT_IDENTITY_KEY,
        DbType::Sql => "id",
    };
    Ok(ApiResponse::success(rows.iter().map(|r| r.to_output(identity_key)).collect()))
}
