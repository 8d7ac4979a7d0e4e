use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The six payload fields shared by both stores
pub const EMPLOYEE_FIELDS: &[&str] = &[
    "name",
    "age",
    "department",
    "salary_amount",
    "salary_currency",
    "location",
];

/// Identity keys. These are carried alongside a record, never inside its payload.
pub const IDENTITY_FIELDS: &[&str] = &["id", "doc_id", SNAPSHOT_IDENTITY_KEY];

/// Reserved key under which a snapshot row carries its identity
pub const SNAPSHOT_IDENTITY_KEY: &str = "__doc_id__";

/// Backend-assigned identity: `id` for the relational store, `doc_id` for documents
pub type RecordId = i64;

/// Errors that can occur while building records from generated input
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Identity field '{0}' cannot be set from a generated query")]
    IdentityFieldNotAllowed(String),
    #[error("Invalid JSON format: {0}")]
    InvalidJson(String),
}

/// Mutable payload of one employee record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record from generated JSON, rejecting identity fields
    pub fn from_json(json: Value) -> Result<Self, RecordError> {
        match json {
            Value::Object(map) => {
                if let Some(key) = map.keys().find(|k| is_identity_field(k)) {
                    return Err(RecordError::IdentityFieldNotAllowed(key.clone()));
                }
                Ok(Self { fields: map })
            }
            _ => Err(RecordError::InvalidJson("Expected JSON object".to_string())),
        }
    }

    /// Create a record from stored data, splitting identity keys out of the payload
    pub fn from_stored(mut map: Map<String, Value>) -> Self {
        for key in IDENTITY_FIELDS {
            map.remove(*key);
        }
        Self { fields: map }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let key = key.into();
        if is_identity_field(&key) {
            tracing::warn!("Attempted to set identity field '{}' - ignoring", key);
            return self;
        }
        self.fields.insert(key, value.into());
        self
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self::from_stored(map)
    }
}

pub fn is_identity_field(key: &str) -> bool {
    IDENTITY_FIELDS.contains(&key)
}

/// A record together with the identity its store assigned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    #[serde(rename = "__doc_id__")]
    pub id: RecordId,
    #[serde(flatten)]
    pub record: Record,
}

impl StoredRecord {
    pub fn new(id: RecordId, record: Record) -> Self {
        Self { id, record }
    }

    /// Render for API output with the identity under the store's own key
    pub fn to_output(&self, identity_key: &str) -> Value {
        let mut map = Map::new();
        map.insert(identity_key.to_string(), Value::from(self.id));
        for (k, v) in self.record.fields() {
            map.insert(k.clone(), v.clone());
        }
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json_rejects_identity_fields() {
        let err = Record::from_json(json!({"id": 4, "name": "Amit"})).unwrap_err();
        assert!(matches!(err, RecordError::IdentityFieldNotAllowed(k) if k == "id"));
        assert!(Record::from_json(json!([1, 2])).is_err());
    }

    #[test]
    fn from_stored_strips_identity() {
        let map = json!({"id": 3, "name": "Neha", "age": 27});
        let record = Record::from_stored(map.as_object().unwrap().clone());
        assert!(record.get("id").is_none());
        assert_eq!(record.get("age"), Some(&json!(27)));
    }

    #[test]
    fn stored_record_serializes_identity_under_reserved_key() {
        let mut record = Record::new();
        record.set("name", "Raj");
        let stored = StoredRecord::new(5, record);
        let value = serde_json::to_value(&stored).unwrap();
        assert_eq!(value, json!({"__doc_id__": 5, "name": "Raj"}));
        let back: StoredRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, stored);
    }
}
