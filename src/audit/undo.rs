use thiserror::Error;
use tracing::{info, warn};

use super::entry::AuditId;
use super::log::AuditLog;
use crate::database::{DatabaseError, StoreSet};
use crate::types::DbType;

#[derive(Debug, Error)]
pub enum UndoError {
    #[error("Log entry {0} not found")]
    NotFound(AuditId),

    #[error("Action {0} already undone")]
    AlreadyUndone(AuditId),

    #[error("No snapshot available for action {0}")]
    NoSnapshot(AuditId),

    #[error("Undo failed: {0}")]
    Execution(#[from] DatabaseError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct UndoReport {
    pub id: AuditId,
    pub db_type: DbType,
    pub restored: usize,
}

/// Replays an audit entry's snapshot into the backend it came from
pub struct UndoEngine;

impl UndoEngine {
    /// Restore the entry's snapshot and mark it undone.
    ///
    /// A failure leaves the entry untouched, although rows restored before the
    /// failing one stay restored.
    pub async fn undo(log: &mut AuditLog, stores: &StoreSet, id: AuditId) -> Result<UndoReport, UndoError> {
        let entry = log.get(id).ok_or(UndoError::NotFound(id))?;
        if entry.undone {
            return Err(UndoError::AlreadyUndone(id));
        }
        let (Some(db_type), Some(snapshot)) = (entry.db_type, entry.restorable_snapshot()) else {
            return Err(UndoError::NoSnapshot(id));
        };
        let snapshot = snapshot.to_vec();

        let restored = match stores.get(db_type).restore(&snapshot).await {
            Ok(n) => n,
            Err(e) => {
                warn!("Undo of action {} failed: {}", id, e);
                return Err(UndoError::Execution(e));
            }
        };

        log.mark_undone(id);
        info!("Undid action {}: restored {} record(s) into {}", id, restored, db_type);
        Ok(UndoReport { id, db_type, restored })
    }
}
