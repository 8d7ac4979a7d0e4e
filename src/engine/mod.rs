//! Request pipeline: permission check, generation, execution, audit.
//!
//! Every request leaves audit entries behind: a permission failure records
//! one, everything else records one for generation and (when generation
//! succeeded) one for execution. Only successful mutations carry snapshots.

pub mod error;
pub mod request;

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::audit::{AuditAction, AuditDraft, AuditId, AuditLog, AuditStatus, UndoEngine, UndoError, UndoReport};
use crate::database::seed::SCHEMA_DESCRIPTION;
use crate::database::StoreSet;
use crate::executor::{ExecutionError, MutationExecutor, MutationOutcome, ReadExecutor};
use crate::generation::{GeneratedQuery, GenerationRequest, QueryGenerator};
use crate::types::{DbType, Mode, Stage};

pub use error::EngineError;
pub use request::{QueryRequest, QueryResult};

pub const PERMISSION_DENIED_MESSAGE: &str = "You do not have permission to perform mutations.";

pub struct QueryEngine {
    stores: StoreSet,
    generator: Arc<dyn QueryGenerator>,
    audit: AuditLog,
    enable_insights: bool,
}

impl QueryEngine {
    pub fn new(stores: StoreSet, generator: Arc<dyn QueryGenerator>, audit: AuditLog) -> Self {
        Self { stores, generator, audit, enable_insights: true }
    }

    pub fn with_insights(mut self, enabled: bool) -> Self {
        self.enable_insights = enabled;
        self
    }

    pub fn stores(&self) -> &StoreSet {
        &self.stores
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    pub async fn run(&mut self, request: &QueryRequest) -> Result<QueryResult, EngineError> {
        info!(
            "Query prompt={:?} role={} mode={} db_type={}",
            request.prompt, request.role, request.mode, request.db_type
        );

        if request.mode == Mode::Mutation && !request.role.can_mutate() {
            self.audit.record(AuditDraft::new(
                request.role.as_str(),
                AuditAction::Query,
                request.prompt.clone(),
                AuditStatus::PermissionDenied,
            ))
            .await;
            return Err(EngineError::new(Stage::Permission, PERMISSION_DENIED_MESSAGE));
        }

        let query = self.generate(request).await?;
        match &query {
            GeneratedQuery::Sql(sql) if request.mode == Mode::Mutation => {
                let outcome = MutationExecutor::relational(&self.stores.relational, sql).await;
                self.finish_mutation(request, &query, outcome).await
            }
            GeneratedQuery::Mutation(mutation) => {
                let outcome = MutationExecutor::documents(&self.stores.documents, mutation).await;
                self.finish_mutation(request, &query, outcome).await
            }
            GeneratedQuery::Sql(sql) => {
                let results = ReadExecutor::relational(&self.stores.relational, sql).await;
                self.finish_read(request, &query, results).await
            }
            GeneratedQuery::Read(read) => {
                let results = ReadExecutor::documents(&self.stores.documents, read).await;
                self.finish_read(request, &query, results).await
            }
        }
    }

    /// Restore the snapshot of audit entry `id`
    pub async fn undo(&mut self, id: AuditId) -> Result<UndoReport, UndoError> {
        UndoEngine::undo(&mut self.audit, &self.stores, id).await
    }

    async fn generate(&mut self, request: &QueryRequest) -> Result<GeneratedQuery, EngineError> {
        let schema = match self.stores.get(request.db_type).describe().await {
            Ok(schema) => schema,
            Err(e) => {
                warn!("Schema introspection failed, using static description: {}", e);
                SCHEMA_DESCRIPTION.to_string()
            }
        };
        let generation = GenerationRequest {
            prompt: request.prompt.clone(),
            schema,
            mode: request.mode,
            db_type: request.db_type,
        };

        let parsed = match self.generator.generate(&generation).await {
            Ok(raw) => GeneratedQuery::parse(&raw, request.db_type, request.mode),
            Err(e) => Err(e),
        };

        let action = AuditAction::generation(request.db_type);
        match parsed {
            Ok(query) => {
                self.audit
                    .record(AuditDraft::new(request.role.as_str(), action, request.prompt.clone(), AuditStatus::Success))
                    .await;
                Ok(query)
            }
            Err(e) => {
                warn!("Generation failed: {}", e);
                self.audit.record(AuditDraft::new(
                    request.role.as_str(),
                    action,
                    request.prompt.clone(),
                    AuditStatus::Failed(e.to_string()),
                ))
                .await;
                Err(EngineError::new(Stage::Generation, e.to_string()))
            }
        }
    }

    async fn finish_read(
        &mut self,
        request: &QueryRequest,
        query: &GeneratedQuery,
        results: Result<Vec<Value>, ExecutionError>,
    ) -> Result<QueryResult, EngineError> {
        let results = self.check_execution(request, query, results).await?;
        let insights = self.insights(&request.prompt, &results).await;
        let audit_id = self.audit.record(
            AuditDraft::new(request.role.as_str(), AuditAction::execution(request.db_type), query.render(), AuditStatus::Success)
                .on(request.db_type),
        )
        .await;

        Ok(QueryResult {
            status: "success".to_string(),
            db_type: request.db_type,
            db_label: request.db_type.label().to_string(),
            generated_query: query.to_json(),
            count: results.len(),
            results,
            insights,
            message: None,
            audit_id,
        })
    }

    async fn finish_mutation(
        &mut self,
        request: &QueryRequest,
        query: &GeneratedQuery,
        outcome: Result<MutationOutcome, ExecutionError>,
    ) -> Result<QueryResult, EngineError> {
        let outcome = self.check_execution(request, query, outcome).await?;
        let audit_id = self.audit.record(
            AuditDraft::new(request.role.as_str(), AuditAction::mutation(request.db_type), query.render(), AuditStatus::Success)
                .on(request.db_type)
                .with_snapshot(outcome.snapshot),
        )
        .await;

        Ok(QueryResult {
            status: "success".to_string(),
            db_type: request.db_type,
            db_label: request.db_type.label().to_string(),
            generated_query: query.to_json(),
            results: Vec::new(),
            count: 0,
            insights: String::new(),
            message: Some(outcome.message),
            audit_id,
        })
    }

    /// Record an execution failure; the snapshot, if any, goes with the error
    async fn check_execution<T>(
        &mut self,
        request: &QueryRequest,
        query: &GeneratedQuery,
        result: Result<T, ExecutionError>,
    ) -> Result<T, EngineError> {
        let e = match result {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };
        warn!("Execution failed on {}: {}", request.db_type, e);
        self.audit
            .record(
                AuditDraft::new(
                    request.role.as_str(),
                    AuditAction::execution(request.db_type),
                    query.render(),
                    AuditStatus::Failed(e.to_string()),
                )
                .on(request.db_type),
            )
            .await;
        Err(EngineError::new(Stage::Execution, e.to_string()))
    }

    async fn insights(&self, prompt: &str, results: &[Value]) -> String {
        if !self.enable_insights || results.is_empty() {
            return String::new();
        }
        match self.generator.summarize(prompt, results).await {
            Ok(text) => text,
            Err(e) => format!("Could not generate insights: {}", e),
        }
    }
}

/// Which backend a request will hit, for callers that only hold the engine
pub fn describe_target(db_type: DbType) -> String {
    format!("{} · employees", db_type.label())
}
