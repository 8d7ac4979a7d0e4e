use axum::extract::State;

use super::AppState;
use crate::audit::AuditEntry;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/audit - audit trail, most recent first
pub async fn get(State(state): State<AppState>) -> ApiResult<Vec<AuditEntry>> {
    let engine = state.engine.lock().await;
    Ok(ApiResponse::success(engine.audit().list()))
}
