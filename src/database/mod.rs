pub mod document;
pub mod error;
pub mod record;
pub mod relational;
pub mod seed;
pub mod store;

pub use document::DocumentStore;
pub use error::DatabaseError;
pub use record::{Record, RecordError, RecordId, StoredRecord};
pub use relational::{RelationalStore, SnapshotScope, SqlMutationOutcome};
pub use store::{RecordStore, StoreSet};
