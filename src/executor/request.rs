use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::database::{RecordId, StoredRecord};
use crate::filter::FilterData;

/// Document read: `{filter?, sort?}`
pub type ReadQuery = FilterData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationMethod {
    Insert,
    Update,
    Delete,
}

/// Structured document mutation produced by the generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationRequest {
    pub method: MutationMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<Value>,
}

/// Result of one executed mutation
#[derive(Debug, Clone)]
pub struct MutationOutcome {
    pub affected: u64,
    pub message: String,
    /// Pre-images of the affected records; `None` when the operation is not reversible
    pub snapshot: Option<Vec<StoredRecord>>,
    pub inserted_id: Option<RecordId>,
}
