pub mod entry;
pub mod log;
pub mod undo;

pub use entry::{AuditAction, AuditDraft, AuditEntry, AuditId, AuditStatus};
pub use log::AuditLog;
pub use undo::{UndoEngine, UndoError, UndoReport};
