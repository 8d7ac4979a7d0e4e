use async_trait::async_trait;

use super::error::DatabaseError;
use super::record::StoredRecord;
use crate::types::DbType;

/// Operations every backend offers regardless of its query language.
/// Undo and the schema/records endpoints only need this much.
#[async_trait]
pub trait RecordStore: Send + Sync {
    fn db_type(&self) -> DbType;

    /// Human-readable location for health output
    fn location(&self) -> String;

    /// Schema text handed to the generator
    async fn describe(&self) -> Result<String, DatabaseError>;

    async fn all(&self) -> Result<Vec<StoredRecord>, DatabaseError>;

    /// Write each row back under its own identity, creating it when absent.
    /// Not atomic: rows restored before a failure stay restored.
    async fn restore(&self, rows: &[StoredRecord]) -> Result<usize, DatabaseError>;
}

/// The two backends a process serves, addressable by [`DbType`]
pub struct StoreSet {
    pub documents: super::DocumentStore,
    pub relational: super::RelationalStore,
}

impl StoreSet {
    pub fn new(documents: super::DocumentStore, relational: super::RelationalStore) -> Self {
        Self { documents, relational }
    }

    pub fn get(&self, db_type: DbType) -> &dyn RecordStore {
        match db_type {
            DbType::Nosql => &self.documents,
            DbType::Sql => &self.relational,
        }
    }
}
