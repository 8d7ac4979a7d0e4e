use axum::extract::{rejection::JsonRejection, State};
use axum::Json;

use super::AppState;
use crate::engine::{QueryRequest, QueryResult};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// POST /api/query - translate, execute and audit one natural-language request
pub async fn post(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> ApiResult<QueryResult> {
    let Json(request) = payload?;
    if request.prompt.trim().is_empty() {
        return Err(ApiError::bad_request("prompt must not be empty"));
    }

    let mut engine = state.engine.lock().await;
    let result = engine.run(&request).await?;
    Ok(ApiResponse::success(result))
}
