use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{DbType, Mode, Role};

/// One natural-language request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub prompt: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub db_type: DbType,
}

impl QueryRequest {
    pub fn new(prompt: impl Into<String>, role: Role, mode: Mode, db_type: DbType) -> Self {
        Self { prompt: prompt.into(), role, mode, db_type }
    }
}

/// Successful outcome of a read or a mutation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub status: String,
    pub db_type: DbType,
    pub db_label: String,
    pub generated_query: Value,
    pub results: Vec<Value>,
    pub count: usize,
    pub insights: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Audit id of the execution entry; undo takes this id
    pub audit_id: u64,
}
