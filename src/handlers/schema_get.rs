use axum::extract::{rejection::QueryRejection, Query, State};
use serde::Serialize;

use super::{AppState, DbTypeQuery};
use crate::database::RecordStore;
use crate::engine::describe_target;
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::DbType;

#[derive(Debug, Serialize)]
pub struct SchemaInfo {
    pub db_type: DbType,
    pub schema: String,
    pub source: String,
}

/// GET /api/schema - the schema text the generator is given
pub async fn get(
    State(state): State<AppState>,
    query: Result<Query<DbTypeQuery>, QueryRejection>,
) -> ApiResult<SchemaInfo> {
    let Query(query) = query?;
    let engine = state.engine.lock().await;
    let schema = engine.stores().get(query.db_type).describe().await?;

    Ok(ApiResponse::success(SchemaInfo {
        db_type: query.db_type,
        schema,
        source: describe_target(query.db_type),
    }))
}
