use std::path::PathBuf;

use chrono::Local;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use super::entry::{AuditDraft, AuditEntry, AuditId};

/// In-memory audit trail, optionally mirrored to a JSON-lines side file.
///
/// Ids come from a counter starting at 0 and are never reused. Entries are
/// never removed; the only permitted change is flipping `undone` once.
#[derive(Debug, Default)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
    next_id: AuditId,
    side_file: Option<PathBuf>,
}

impl AuditLog {
    pub fn new(side_file: Option<PathBuf>) -> Self {
        Self { entries: Vec::new(), next_id: 0, side_file }
    }

    pub async fn record(&mut self, draft: AuditDraft) -> AuditId {
        let id = self.next_id;
        self.next_id += 1;

        let entry = AuditEntry {
            id,
            timestamp: Local::now(),
            user: draft.user,
            action: draft.action,
            query: draft.query,
            status: draft.status,
            db_type: draft.db_type,
            snapshot: draft.snapshot,
            undone: false,
        };
        debug!("Audit #{} {} -> {}", id, entry.action, entry.status);
        self.append_to_side_file(&entry).await;
        self.entries.push(entry);
        id
    }

    /// Most recent first
    pub fn list(&self) -> Vec<AuditEntry> {
        self.entries.iter().rev().cloned().collect()
    }

    pub fn get(&self, id: AuditId) -> Option<&AuditEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flip `undone`. Returns false when the entry is missing or already undone.
    pub(crate) fn mark_undone(&mut self, id: AuditId) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) if !entry.undone => {
                entry.undone = true;
                true
            }
            _ => false,
        }
    }

    // Best effort: a failed write is logged and otherwise ignored
    async fn append_to_side_file(&self, entry: &AuditEntry) {
        let Some(path) = &self.side_file else {
            return;
        };
        let line = match serde_json::to_value(entry) {
            Ok(serde_json::Value::Object(mut map)) => {
                map.remove("snapshot");
                serde_json::Value::Object(map).to_string()
            }
            Ok(_) => return,
            Err(e) => {
                warn!("Failed to serialize audit entry {}: {}", entry.id, e);
                return;
            }
        };
        let result = match OpenOptions::new().create(true).append(true).open(path).await {
            Ok(mut file) => file.write_all(format!("{}\n", line).as_bytes()).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!("Failed to append audit entry to {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::entry::{AuditAction, AuditStatus};
    use crate::types::DbType;

    fn draft(query: &str) -> AuditDraft {
        AuditDraft::new("Admin", AuditAction::generation(DbType::Nosql), query, AuditStatus::Success)
    }

    #[tokio::test]
    async fn ids_start_at_zero_and_increase() {
        let mut log = AuditLog::new(None);
        assert_eq!(log.record(draft("a")).await, 0);
        assert_eq!(log.record(draft("b")).await, 1);
        assert_eq!(log.record(draft("c")).await, 2);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let mut log = AuditLog::new(None);
        log.record(draft("first")).await;
        log.record(draft("second")).await;
        let queries: Vec<String> = log.list().into_iter().map(|e| e.query).collect();
        assert_eq!(queries, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn undone_flips_once() {
        let mut log = AuditLog::new(None);
        let id = log.record(draft("x")).await;
        assert!(log.mark_undone(id));
        assert!(!log.mark_undone(id));
        assert!(!log.mark_undone(42));
        assert!(log.get(id).map(|e| e.undone).unwrap_or(false));
    }

    #[tokio::test]
    async fn side_file_gets_one_line_per_entry_without_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let mut log = AuditLog::new(Some(path.clone()));
        log.record(draft("one").with_snapshot(Some(vec![]))).await;
        log.record(draft("two")).await;

        let text = tokio::fs::read_to_string(&path).await.unwrap();
        let lines: Vec<serde_json::Value> = text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["query"], "one");
        assert!(lines[0].get("snapshot").is_none());
    }

    #[tokio::test]
    async fn unwritable_side_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = AuditLog::new(Some(dir.path().join("missing").join("audit.jsonl")));
        assert_eq!(log.record(draft("still recorded")).await, 0);
        assert_eq!(log.len(), 1);
    }
}
