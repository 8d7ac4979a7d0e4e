use axum::extract::{Path, State};
use serde::Serialize;

use super::AppState;
use crate::audit::AuditId;
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::DbType;

#[derive(Debug, Serialize)]
pub struct UndoResponse {
    pub message: String,
    pub id: AuditId,
    pub db_type: DbType,
    pub restored: usize,
}

/// POST /api/audit/undo/:id - restore the snapshot of one audit entry
pub async fn post(State(state): State<AppState>, Path(id): Path<AuditId>) -> ApiResult<UndoResponse> {
    let mut engine = state.engine.lock().await;
    let report = engine.undo(id).await?;

    Ok(ApiResponse::success(UndoResponse {
        message: "Action undone successfully".to_string(),
        id: report.id,
        db_type: report.db_type,
        restored: report.restored,
    }))
}
