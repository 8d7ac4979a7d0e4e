use serde_json::Value;
use tracing::debug;

use super::error::ExecutionError;
use super::request::ReadQuery;
use super::sql::SqlStatementKind;
use crate::database::{DocumentStore, RelationalStore};
use crate::filter::Filter;

/// Identity key used when document results are rendered
pub const DOCUMENT_IDENTITY_KEY: &str = "doc_id";

pub struct ReadExecutor;

impl ReadExecutor {
    /// Filter and sort the document collection
    pub async fn documents(store: &DocumentStore, query: &ReadQuery) -> Result<Vec<Value>, ExecutionError> {
        let mut filter = Filter::new();
        filter.assign(query.clone())?;
        let docs = store.search(&filter).await?;
        debug!("Document read matched {} record(s)", docs.len());
        Ok(docs.iter().map(|d| d.to_output(DOCUMENT_IDENTITY_KEY)).collect())
    }

    /// Run a SELECT against the relational store
    pub async fn relational(store: &RelationalStore, sql: &str) -> Result<Vec<Value>, ExecutionError> {
        let kind = SqlStatementKind::classify(sql);
        if !kind.is_read() {
            return Err(ExecutionError::NotAReadStatement(match kind {
                SqlStatementKind::Other(name) => name,
                SqlStatementKind::Batch(n) => format!("Batches of {}", n),
                _ => super::sql::statement_verb(sql),
            }));
        }
        let rows = store.query(sql).await?;
        debug!("SQL read returned {} row(s)", rows.len());
        Ok(rows.into_iter().map(Value::Object).collect())
    }
}
