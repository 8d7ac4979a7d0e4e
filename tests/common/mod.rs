#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tempfile::TempDir;

use datasense_api::audit::AuditLog;
use datasense_api::database::{DocumentStore, RecordStore, RelationalStore, StoreSet};
use datasense_api::engine::{QueryEngine, QueryRequest};
use datasense_api::generation::{GenerationError, GenerationRequest, QueryGenerator};
use datasense_api::handlers::{self, AppState};
use datasense_api::types::{DbType, Mode, Role};

/// Generator that replays canned responses in order.
///
/// `Err` entries surface as a generator failure. Once the script runs out
/// every call fails with `EmptyOutput`.
#[derive(Default)]
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn new<I, S>(responses: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let generator = Self::default();
        generator.push_all(responses);
        Arc::new(generator)
    }

    pub fn push(&self, response: impl Into<String>) {
        self.responses.lock().unwrap().push_back(Ok(response.into()));
    }

    pub fn push_all<I, S>(&self, responses: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for r in responses {
            self.push(r);
        }
    }

    pub fn push_failure(&self, message: impl Into<String>) {
        self.responses.lock().unwrap().push_back(Err(message.into()));
    }

    /// Every request the engine sent, in order
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(request.clone());
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(GenerationError::MalformedResponse(message)),
            None => Err(GenerationError::EmptyOutput),
        }
    }

    async fn summarize(&self, _prompt: &str, results: &[Value]) -> Result<String, GenerationError> {
        Ok(format!("- {} record(s) matched", results.len()))
    }
}

/// Seeded file-backed stores inside a fresh temp directory
pub async fn seeded_stores() -> Result<(TempDir, StoreSet)> {
    let dir = tempfile::tempdir().context("creating temp dir")?;
    let documents = DocumentStore::open(dir.path().join("employees.json"), true).await?;
    let relational = RelationalStore::open(dir.path().join("employees.db"), true).await?;
    Ok((dir, StoreSet::new(documents, relational)))
}

/// Engine over seeded stores with insights disabled
pub async fn engine(generator: Arc<ScriptedGenerator>) -> Result<(TempDir, QueryEngine)> {
    let (dir, stores) = seeded_stores().await?;
    let engine = QueryEngine::new(stores, generator, AuditLog::new(None)).with_insights(false);
    Ok((dir, engine))
}

pub fn admin(prompt: &str, mode: Mode, db_type: DbType) -> QueryRequest {
    QueryRequest::new(prompt, Role::Admin, mode, db_type)
}

pub fn viewer(prompt: &str, mode: Mode, db_type: DbType) -> QueryRequest {
    QueryRequest::new(prompt, Role::Viewer, mode, db_type)
}

/// Field values of `rows`, in result order
pub fn column<'a>(rows: &'a [Value], field: &str) -> Vec<&'a Value> {
    rows.iter().filter_map(|r| r.get(field)).collect()
}

/// A live server on an ephemeral port, torn down when dropped
pub struct TestServer {
    pub base_url: String,
    _dir: TempDir,
    handle: tokio::task::JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub async fn spawn_server(generator: Arc<ScriptedGenerator>) -> Result<TestServer> {
    let (dir, stores) = seeded_stores().await?;
    let engine = QueryEngine::new(stores, generator, AuditLog::new(None));
    let app = handlers::router(AppState::new(engine));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.context("binding test listener")?;
    let addr = listener.local_addr()?;
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(TestServer { base_url: format!("http://{}", addr), _dir: dir, handle })
}

/// Current records of one store rendered with an `id` key
pub async fn records(engine: &QueryEngine, db_type: DbType) -> Result<Vec<Value>> {
    let rows = engine.stores().get(db_type).all().await?;
    Ok(rows.iter().map(|r| r.to_output("id")).collect())
}

/// Field value of the record called `name`
pub async fn field_of(engine: &QueryEngine, db_type: DbType, name: &str, field: &str) -> Result<Value> {
    let rows = records(engine, db_type).await?;
    rows.iter()
        .find(|r| r.get("name").and_then(Value::as_str) == Some(name))
        .and_then(|r| r.get(field).cloned())
        .with_context(|| format!("no {} for {}", field, name))
}
