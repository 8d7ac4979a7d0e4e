use std::fmt;

use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};

use crate::database::StoredRecord;
use crate::types::DbType;

pub type AuditId = u64;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// What an audit entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    GenerateDocumentQuery,
    ExecuteDocumentQuery,
    DocumentMutation,
    GenerateSql,
    ExecuteSql,
    SqlMutation,
    /// A request rejected before any stage ran
    Query,
}

impl AuditAction {
    pub fn generation(db_type: DbType) -> Self {
        match db_type {
            DbType::Nosql => AuditAction::GenerateDocumentQuery,
            DbType::Sql => AuditAction::GenerateSql,
        }
    }

    pub fn execution(db_type: DbType) -> Self {
        match db_type {
            DbType::Nosql => AuditAction::ExecuteDocumentQuery,
            DbType::Sql => AuditAction::ExecuteSql,
        }
    }

    pub fn mutation(db_type: DbType) -> Self {
        match db_type {
            DbType::Nosql => AuditAction::DocumentMutation,
            DbType::Sql => AuditAction::SqlMutation,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::GenerateDocumentQuery => "Generate NoSQL Query",
            AuditAction::ExecuteDocumentQuery => "Execute NoSQL Query",
            AuditAction::DocumentMutation => "NoSQL Mutation",
            AuditAction::GenerateSql => "Generate SQL",
            AuditAction::ExecuteSql => "Execute SQL",
            AuditAction::SqlMutation => "SQL Mutation",
            AuditAction::Query => "Query",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AuditAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Outcome of an audited step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditStatus {
    Success,
    Failed(String),
    PermissionDenied,
}

impl AuditStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, AuditStatus::Success)
    }
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditStatus::Success => f.write_str("Success"),
            AuditStatus::Failed(reason) => write!(f, "Failed: {}", reason),
            AuditStatus::PermissionDenied => f.write_str("Failed – Permission Denied"),
        }
    }
}

impl Serialize for AuditStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One logged attempt. Only `undone` ever changes after creation.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub id: AuditId,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Local>,
    pub user: String,
    pub action: AuditAction,
    pub query: String,
    pub status: AuditStatus,
    pub db_type: Option<DbType>,
    pub snapshot: Option<Vec<StoredRecord>>,
    pub undone: bool,
}

impl AuditEntry {
    /// Snapshot usable by undo; an empty capture counts as none
    pub fn restorable_snapshot(&self) -> Option<&[StoredRecord]> {
        self.snapshot.as_deref().filter(|rows| !rows.is_empty())
    }
}

fn serialize_timestamp<S: Serializer>(ts: &DateTime<Local>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&ts.format(TIMESTAMP_FORMAT))
}

/// Fields supplied by the caller; the log assigns id and timestamp
#[derive(Debug, Clone)]
pub struct AuditDraft {
    pub user: String,
    pub action: AuditAction,
    pub query: String,
    pub status: AuditStatus,
    pub db_type: Option<DbType>,
    pub snapshot: Option<Vec<StoredRecord>>,
}

impl AuditDraft {
    pub fn new(user: impl Into<String>, action: AuditAction, query: impl Into<String>, status: AuditStatus) -> Self {
        Self {
            user: user.into(),
            action,
            query: query.into(),
            status,
            db_type: None,
            snapshot: None,
        }
    }

    pub fn on(mut self, db_type: DbType) -> Self {
        self.db_type = Some(db_type);
        self
    }

    pub fn with_snapshot(mut self, snapshot: Option<Vec<StoredRecord>>) -> Self {
        self.snapshot = snapshot;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_strings() {
        assert_eq!(AuditStatus::Success.to_string(), "Success");
        assert_eq!(AuditStatus::Failed("boom".into()).to_string(), "Failed: boom");
        assert_eq!(AuditStatus::PermissionDenied.to_string(), "Failed – Permission Denied");
    }

    #[test]
    fn serializes_flat() {
        let entry = AuditEntry {
            id: 3,
            timestamp: Local::now(),
            user: "Admin".into(),
            action: AuditAction::mutation(DbType::Sql),
            query: "DELETE FROM employees".into(),
            status: AuditStatus::Success,
            db_type: Some(DbType::Sql),
            snapshot: Some(vec![]),
            undone: false,
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["action"], json!("SQL Mutation"));
        assert_eq!(value["status"], json!("Success"));
        assert_eq!(value["db_type"], json!("sql"));
        assert_eq!(value["timestamp"].as_str().map(str::len), Some(19));
        assert!(entry.restorable_snapshot().is_none());
    }
}
