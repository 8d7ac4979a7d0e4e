use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::error::DatabaseError;
use super::record::{Record, RecordId, StoredRecord};
use super::seed::{seed_employees, SCHEMA_DESCRIPTION};
use super::store::RecordStore;
use crate::filter::Filter;
use crate::types::DbType;

/// Name of the single collection inside the document file
pub const COLLECTION: &str = "employees";

type Collection = BTreeMap<RecordId, Record>;

enum Backing {
    File(PathBuf),
    Memory(RwLock<Collection>),
}

/// Schemaless employee collection persisted as one JSON file.
///
/// The file layout is `{"employees": {"<doc_id>": {...fields}}}`. Other top-level
/// tables in the file are preserved on write. Every operation loads the file,
/// works on it and writes it back, so nothing is held between requests.
pub struct DocumentStore {
    backing: Backing,
}

impl DocumentStore {
    /// Open the file at `path`, creating it (and seeding it when `seed_on_create`)
    /// if it does not exist yet.
    pub async fn open(path: impl Into<PathBuf>, seed_on_create: bool) -> Result<Self, DatabaseError> {
        let path = path.into();
        let is_new = !tokio::fs::try_exists(&path).await.map_err(|e| DatabaseError::io(&path, e))?;
        let store = Self { backing: Backing::File(path.clone()) };

        if is_new {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await.map_err(|e| DatabaseError::io(parent, e))?;
            }
            let seeded = if seed_on_create { Self::seeded_collection() } else { Collection::new() };
            store.save(&seeded).await?;
            info!("Document store created ({} docs) at {}", seeded.len(), path.display());
        } else {
            let loaded = store.load().await?;
            info!("Document store loaded ({} docs, no seeding) from {}", loaded.len(), path.display());
        }
        Ok(store)
    }

    /// A store that lives only in memory
    pub fn in_memory(seed: bool) -> Self {
        let collection = if seed { Self::seeded_collection() } else { Collection::new() };
        Self { backing: Backing::Memory(RwLock::new(collection)) }
    }

    fn seeded_collection() -> Collection {
        seed_employees()
            .into_iter()
            .enumerate()
            .map(|(i, record)| (i as RecordId + 1, record))
            .collect()
    }

    async fn load(&self) -> Result<Collection, DatabaseError> {
        match &self.backing {
            Backing::Memory(lock) => Ok(lock.read().await.clone()),
            Backing::File(path) => {
                let text = tokio::fs::read_to_string(path).await.map_err(|e| DatabaseError::io(path, e))?;
                parse_collection(&text)
            }
        }
    }

    async fn save(&self, collection: &Collection) -> Result<(), DatabaseError> {
        match &self.backing {
            Backing::Memory(lock) => {
                *lock.write().await = collection.clone();
                Ok(())
            }
            Backing::File(path) => {
                // Keep any other tables the file carries
                let mut top = match tokio::fs::read_to_string(path).await {
                    Ok(text) => match serde_json::from_str::<Value>(&text) {
                        Ok(Value::Object(map)) => map,
                        _ => Map::new(),
                    },
                    Err(_) => Map::new(),
                };
                top.insert(COLLECTION.to_string(), render_collection(collection));
                let text = serde_json::to_string(&Value::Object(top))?;
                write_atomically(path, text.as_bytes()).await
            }
        }
    }

    pub async fn len(&self) -> Result<usize, DatabaseError> {
        Ok(self.load().await?.len())
    }

    /// Insert a new document and return its assigned `doc_id` (max + 1)
    pub async fn insert(&self, record: Record) -> Result<RecordId, DatabaseError> {
        let mut collection = self.load().await?;
        let id = collection.keys().next_back().map(|id| id + 1).unwrap_or(1);
        collection.insert(id, record);
        self.save(&collection).await?;
        debug!("Inserted document {}", id);
        Ok(id)
    }

    /// Matching documents in the filter's order
    pub async fn search(&self, filter: &Filter) -> Result<Vec<StoredRecord>, DatabaseError> {
        let records = stored(self.load().await?);
        Ok(filter.apply(records))
    }

    /// Replace the payload of existing documents. Unknown ids are an error and
    /// nothing is written in that case.
    pub async fn update_many(&self, rows: &[StoredRecord]) -> Result<usize, DatabaseError> {
        let mut collection = self.load().await?;
        for row in rows {
            match collection.get_mut(&row.id) {
                Some(slot) => *slot = row.record.clone(),
                None => return Err(DatabaseError::NotFound(format!("document {}", row.id))),
            }
        }
        self.save(&collection).await?;
        Ok(rows.len())
    }

    /// Remove documents by id, returning how many existed
    pub async fn remove_ids(&self, ids: &[RecordId]) -> Result<usize, DatabaseError> {
        let mut collection = self.load().await?;
        let removed = ids.iter().filter(|id| collection.remove(id).is_some()).count();
        self.save(&collection).await?;
        Ok(removed)
    }
}

#[async_trait]
impl RecordStore for DocumentStore {
    fn db_type(&self) -> DbType {
        DbType::Nosql
    }

    fn location(&self) -> String {
        match &self.backing {
            Backing::File(path) => format!("Documents → {}", path.display()),
            Backing::Memory(_) => "Documents → (memory)".to_string(),
        }
    }

    async fn describe(&self) -> Result<String, DatabaseError> {
        let collection = self.load().await?;
        let Some(sample) = collection.values().next() else {
            return Ok(SCHEMA_DESCRIPTION.to_string());
        };
        let types: Map<String, Value> = sample
            .fields()
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(json_type_name(v).to_string())))
            .collect();
        Ok(serde_json::to_string_pretty(&Value::Object(types))?)
    }

    async fn all(&self) -> Result<Vec<StoredRecord>, DatabaseError> {
        Ok(stored(self.load().await?))
    }

    async fn restore(&self, rows: &[StoredRecord]) -> Result<usize, DatabaseError> {
        let mut collection = self.load().await?;
        for row in rows {
            collection.insert(row.id, row.record.clone());
        }
        self.save(&collection).await?;
        info!("Restored {} document(s)", rows.len());
        Ok(rows.len())
    }
}

fn stored(collection: Collection) -> Vec<StoredRecord> {
    collection.into_iter().map(|(id, record)| StoredRecord::new(id, record)).collect()
}

fn parse_collection(text: &str) -> Result<Collection, DatabaseError> {
    if text.trim().is_empty() {
        return Ok(Collection::new());
    }
    let top: Value = serde_json::from_str(text)?;
    let Some(table) = top.get(COLLECTION) else {
        return Ok(Collection::new());
    };
    let Value::Object(docs) = table else {
        return Err(DatabaseError::QueryError(format!("'{}' is not an object", COLLECTION)));
    };

    let mut collection = Collection::new();
    for (key, doc) in docs {
        let id: RecordId = key
            .parse()
            .map_err(|_| DatabaseError::QueryError(format!("invalid doc_id '{}'", key)))?;
        let Value::Object(fields) = doc else {
            return Err(DatabaseError::QueryError(format!("document {} is not an object", key)));
        };
        collection.insert(id, Record::from_stored(fields.clone()));
    }
    Ok(collection)
}

fn render_collection(collection: &Collection) -> Value {
    let docs: Map<String, Value> = collection
        .iter()
        .map(|(id, record)| (id.to_string(), Value::Object(record.fields().clone())))
        .collect();
    Value::Object(docs)
}

async fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), DatabaseError> {
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, bytes).await.map_err(|e| DatabaseError::io(&tmp, e))?;
    tokio::fs::rename(&tmp, path).await.map_err(|e| DatabaseError::io(path, e))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "int",
        Value::Number(_) => "float",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
