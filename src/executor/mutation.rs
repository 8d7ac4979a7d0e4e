use serde_json::{Map, Value};
use tracing::{debug, info};

use super::error::ExecutionError;
use super::request::{MutationMethod, MutationOutcome, MutationRequest};
use super::sql::{statement_verb, SqlStatementKind};
use crate::database::{DocumentStore, Record, RelationalStore, SnapshotScope, StoredRecord};
use crate::filter::Filter;
use crate::update::{UpdateApplier, UpdateSpec};

/// Runs mutations with read-before-write snapshotting.
///
/// Snapshots are always taken before the store is touched. Inserts carry no
/// snapshot because nothing exists to roll back to. When execution fails the
/// snapshot is dropped along with the error.
pub struct MutationExecutor;

impl MutationExecutor {
    pub async fn documents(store: &DocumentStore, request: &MutationRequest) -> Result<MutationOutcome, ExecutionError> {
        match request.method {
            MutationMethod::Insert => Self::insert_document(store, request.document.as_ref()).await,
            MutationMethod::Update => {
                let filter = Filter::from_where(request.filter.as_ref())?;
                let spec = UpdateSpec::parse(request.update.as_ref())?;
                Self::update_documents(store, &filter, &spec).await
            }
            MutationMethod::Delete => {
                let filter = Filter::from_where(request.filter.as_ref())?;
                Self::delete_documents(store, &filter).await
            }
        }
    }

    async fn insert_document(store: &DocumentStore, document: Option<&Value>) -> Result<MutationOutcome, ExecutionError> {
        let record = Record::from_json(document.cloned().unwrap_or_else(|| Value::Object(Map::new())))?;
        let id = store.insert(record).await?;
        info!("Inserted document {}", id);
        Ok(MutationOutcome {
            affected: 1,
            message: "Inserted 1 document.".to_string(),
            snapshot: None,
            inserted_id: Some(id),
        })
    }

    async fn update_documents(store: &DocumentStore, filter: &Filter, spec: &UpdateSpec) -> Result<MutationOutcome, ExecutionError> {
        let targets = store.search(filter).await?;
        let snapshot = targets.clone();

        let updated = targets
            .into_iter()
            .map(|row| Ok(StoredRecord::new(row.id, UpdateApplier::apply(&row.record, spec)?)))
            .collect::<Result<Vec<_>, ExecutionError>>()?;

        if !updated.is_empty() {
            store.update_many(&updated).await?;
        }
        info!("Updated {} document(s)", updated.len());
        Ok(MutationOutcome {
            affected: updated.len() as u64,
            message: format!("Updated {} documents.", updated.len()),
            snapshot: Some(snapshot),
            inserted_id: None,
        })
    }

    async fn delete_documents(store: &DocumentStore, filter: &Filter) -> Result<MutationOutcome, ExecutionError> {
        let snapshot = store.search(filter).await?;
        let ids: Vec<_> = snapshot.iter().map(|r| r.id).collect();
        let removed = store.remove_ids(&ids).await?;

        let message = if filter.selects_all() {
            "All documents deleted.".to_string()
        } else {
            "Matching documents deleted.".to_string()
        };
        info!("Deleted {} document(s)", removed);
        Ok(MutationOutcome {
            affected: removed as u64,
            message,
            snapshot: Some(snapshot),
            inserted_id: None,
        })
    }

    /// Execute a DML statement, snapshotting the rows its WHERE clause selects
    pub async fn relational(store: &RelationalStore, sql: &str) -> Result<MutationOutcome, ExecutionError> {
        let kind = SqlStatementKind::classify(sql);
        let scope = kind.snapshot_scope();
        debug!("SQL mutation classified as {:?}, snapshot scope {:?}", kind, scope);

        let outcome = store.execute_mutation(sql, &scope).await?;
        let snapshot = match scope {
            SnapshotScope::None => None,
            _ => Some(outcome.snapshot),
        };
        info!("SQL mutation affected {} row(s)", outcome.rows_affected);
        Ok(MutationOutcome {
            affected: outcome.rows_affected,
            message: format!("{} executed — {} row(s) affected.", statement_verb(sql), outcome.rows_affected),
            snapshot,
            inserted_id: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::RecordStore;
    use serde_json::json;

    fn request(v: Value) -> MutationRequest {
        serde_json::from_value(v).unwrap()
    }

    #[tokio::test]
    async fn update_snapshots_pre_images() {
        let store = DocumentStore::in_memory(true);
        let outcome = MutationExecutor::documents(
            &store,
            &request(json!({"method": "update", "filter": {"name": "Amit"}, "update": {"age": {"$inc": 1}}})),
        )
        .await
        .unwrap();

        assert_eq!(outcome.affected, 1);
        let snapshot = outcome.snapshot.unwrap();
        assert_eq!(snapshot[0].record.get("age"), Some(&json!(29)));
        assert_eq!(store.all().await.unwrap()[0].record.get("age"), Some(&json!(30)));
    }

    #[tokio::test]
    async fn update_with_no_targets_is_zero_count_success() {
        let store = DocumentStore::in_memory(true);
        let outcome = MutationExecutor::documents(
            &store,
            &request(json!({"method": "update", "filter": {"department": "Legal"}, "update": {"age": 1}})),
        )
        .await
        .unwrap();
        assert_eq!(outcome.affected, 0);
        assert_eq!(outcome.snapshot, Some(vec![]));
    }

    #[tokio::test]
    async fn failed_update_writes_nothing() {
        let store = DocumentStore::in_memory(true);
        let before = store.all().await.unwrap();
        let result = MutationExecutor::documents(
            &store,
            &request(json!({"method": "update", "update": {"name": {"$inc": 1}}})),
        )
        .await;
        assert!(matches!(result, Err(ExecutionError::Update(_))));
        assert_eq!(store.all().await.unwrap(), before);
    }

    #[tokio::test]
    async fn empty_delete_truncates() {
        let store = DocumentStore::in_memory(true);
        let outcome = MutationExecutor::documents(&store, &request(json!({"method": "delete", "filter": {}})))
            .await
            .unwrap();
        assert_eq!(outcome.affected, 10);
        assert_eq!(outcome.message, "All documents deleted.");
        assert_eq!(outcome.snapshot.map(|s| s.len()), Some(10));
        assert_eq!(store.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn insert_has_no_snapshot() {
        let store = DocumentStore::in_memory(true);
        let outcome = MutationExecutor::documents(
            &store,
            &request(json!({"method": "insert", "document": {"name": "Zoya", "age": 25}})),
        )
        .await
        .unwrap();
        assert!(outcome.snapshot.is_none());
        assert_eq!(outcome.inserted_id, Some(11));
    }

    #[tokio::test]
    async fn insert_rejects_identity_keys() {
        let store = DocumentStore::in_memory(true);
        let result = MutationExecutor::documents(
            &store,
            &request(json!({"method": "insert", "document": {"doc_id": 1, "name": "Zoya"}})),
        )
        .await;
        assert!(matches!(result, Err(ExecutionError::Record(_))));
    }
}
