use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::{Map, Number, Value};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Column, ConnectOptions, Connection, Row, TypeInfo, ValueRef};
use tracing::{debug, info, warn};

use super::error::DatabaseError;
use super::record::{Record, RecordId, StoredRecord, EMPLOYEE_FIELDS};
use super::seed::seed_employees;
use super::store::RecordStore;
use crate::types::DbType;

/// The single table the relational store manages
pub const TABLE: &str = "employees";

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS employees (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        name            TEXT    NOT NULL,
        age             INTEGER NOT NULL,
        department      TEXT    NOT NULL,
        salary_amount   REAL    NOT NULL,
        salary_currency TEXT    NOT NULL DEFAULT 'INR',
        location        TEXT    NOT NULL
    )";

/// Which rows to capture before a mutating statement runs
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotScope {
    None,
    Table,
    /// Rows matching `selection`, a SQL boolean expression that may refer
    /// to the table through `alias`
    Where { alias: Option<String>, selection: String },
}

#[derive(Debug, Clone)]
pub struct SqlMutationOutcome {
    pub rows_affected: u64,
    pub snapshot: Vec<StoredRecord>,
}

/// SQLite-backed employee table. A connection is opened for each logical
/// operation and closed before returning, also when the operation fails.
pub struct RelationalStore {
    path: PathBuf,
    options: SqliteConnectOptions,
}

impl RelationalStore {
    /// Open (creating if needed) the database file, ensure the table exists
    /// and seed it when the file is new and `seed_on_create` is set.
    pub async fn open(path: impl Into<PathBuf>, seed_on_create: bool) -> Result<Self, DatabaseError> {
        let path = path.into();
        let is_new = !tokio::fs::try_exists(&path).await.map_err(|e| DatabaseError::io(&path, e))?;
        if is_new {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await.map_err(|e| DatabaseError::io(parent, e))?;
            }
        }

        let options = SqliteConnectOptions::new().filename(&path).create_if_missing(true);
        let store = Self { path, options };

        let mut conn = store.connect().await?;
        let result = Self::initialize(&mut conn, is_new && seed_on_create).await;
        Self::close(conn).await;
        let count = result?;

        if is_new {
            info!("SQLite store created ({} rows) at {}", count, store.path.display());
        } else {
            info!("SQLite store loaded ({} rows, no seeding) from {}", count, store.path.display());
        }
        Ok(store)
    }

    async fn initialize(conn: &mut SqliteConnection, seed: bool) -> Result<i64, DatabaseError> {
        sqlx::query(CREATE_TABLE).execute(&mut *conn).await?;
        if seed {
            let mut tx = conn.begin().await?;
            for record in seed_employees() {
                Self::insert_row(&mut *tx, None, &record).await?;
            }
            tx.commit().await?;
        }
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employees")
            .fetch_one(&mut *conn)
            .await?;
        Ok(count)
    }

    async fn connect(&self) -> Result<SqliteConnection, DatabaseError> {
        Ok(self.options.connect().await?)
    }

    async fn close(conn: SqliteConnection) {
        if let Err(e) = conn.close().await {
            warn!("Failed to close SQLite connection: {}", e);
        }
    }

    /// Run a read statement and return each row as a JSON object
    pub async fn query(&self, sql: &str) -> Result<Vec<Map<String, Value>>, DatabaseError> {
        let mut conn = self.connect().await?;
        let result = Self::fetch_objects(&mut conn, sql).await;
        Self::close(conn).await;
        result
    }

    /// Capture the requested snapshot and run the statement inside one
    /// transaction. On failure nothing is committed and the snapshot is dropped.
    pub async fn execute_mutation(&self, sql: &str, scope: &SnapshotScope) -> Result<SqlMutationOutcome, DatabaseError> {
        let mut conn = self.connect().await?;
        let result = Self::mutate(&mut conn, sql, scope).await;
        Self::close(conn).await;
        result
    }

    async fn mutate(conn: &mut SqliteConnection, sql: &str, scope: &SnapshotScope) -> Result<SqlMutationOutcome, DatabaseError> {
        let mut tx = conn.begin().await?;
        let snapshot = match scope {
            SnapshotScope::None => Vec::new(),
            SnapshotScope::Table => {
                let select = format!("SELECT * FROM {} ORDER BY id", TABLE);
                Self::fetch_stored(&mut *tx, &select).await?
            }
            SnapshotScope::Where { alias, selection } => {
                let source = match alias {
                    Some(alias) => format!("{} AS {}", TABLE, alias),
                    None => TABLE.to_string(),
                };
                let select = format!("SELECT * FROM {} WHERE {} ORDER BY id", source, selection);
                Self::fetch_stored(&mut *tx, &select).await?
            }
        };
        debug!("Captured {} row(s) before mutation", snapshot.len());

        let rows_affected = sqlx::query(sql).execute(&mut *tx).await?.rows_affected();
        tx.commit().await?;
        Ok(SqlMutationOutcome { rows_affected, snapshot })
    }

    async fn fetch_objects(conn: &mut SqliteConnection, sql: &str) -> Result<Vec<Map<String, Value>>, DatabaseError> {
        let rows = sqlx::query(sql).fetch_all(&mut *conn).await?;
        rows.iter().map(row_to_json).collect()
    }

    async fn fetch_stored(conn: &mut SqliteConnection, sql: &str) -> Result<Vec<StoredRecord>, DatabaseError> {
        Self::fetch_objects(conn, sql).await?.into_iter().map(into_stored).collect()
    }

    async fn insert_row(conn: &mut SqliteConnection, id: Option<RecordId>, record: &Record) -> Result<u64, DatabaseError> {
        let columns: Vec<&str> = EMPLOYEE_FIELDS
            .iter()
            .copied()
            .filter(|c| record.get(c).is_some())
            .collect();

        let (verb, mut names) = match id {
            Some(_) => ("INSERT OR REPLACE", vec!["id"]),
            None => ("INSERT", vec![]),
        };
        names.extend(columns.iter().copied());
        let placeholders = vec!["?"; names.len()].join(", ");
        let sql = format!("{} INTO {} ({}) VALUES ({})", verb, TABLE, names.join(", "), placeholders);

        let mut query = sqlx::query(&sql);
        if let Some(id) = id {
            query = query.bind(id);
        }
        for column in &columns {
            query = bind_value(query, record.get(column).unwrap_or(&Value::Null));
        }
        Ok(query.execute(&mut *conn).await?.rows_affected())
    }

    async fn restore_rows(conn: &mut SqliteConnection, rows: &[StoredRecord]) -> Result<usize, DatabaseError> {
        let mut restored = 0;
        for row in rows {
            Self::insert_row(conn, Some(row.id), &row.record).await?;
            restored += 1;
        }
        Ok(restored)
    }

    async fn table_info(conn: &mut SqliteConnection) -> Result<Map<String, Value>, DatabaseError> {
        let rows = sqlx::query("PRAGMA table_info(employees)").fetch_all(&mut *conn).await?;
        let mut columns = Map::new();
        for row in rows {
            let name: String = row.try_get("name")?;
            let kind: String = row.try_get("type")?;
            columns.insert(name, Value::String(kind));
        }
        Ok(columns)
    }
}

#[async_trait]
impl RecordStore for RelationalStore {
    fn db_type(&self) -> DbType {
        DbType::Sql
    }

    fn location(&self) -> String {
        format!("SQLite → {}", self.path.display())
    }

    async fn describe(&self) -> Result<String, DatabaseError> {
        let mut conn = self.connect().await?;
        let result = Self::table_info(&mut conn).await;
        Self::close(conn).await;
        Ok(serde_json::to_string_pretty(&Value::Object(result?))?)
    }

    async fn all(&self) -> Result<Vec<StoredRecord>, DatabaseError> {
        let mut conn = self.connect().await?;
        let select = format!("SELECT * FROM {} ORDER BY id", TABLE);
        let result = Self::fetch_stored(&mut conn, &select).await;
        Self::close(conn).await;
        result
    }

    async fn restore(&self, rows: &[StoredRecord]) -> Result<usize, DatabaseError> {
        let mut conn = self.connect().await?;
        let result = Self::restore_rows(&mut conn, rows).await;
        Self::close(conn).await;
        let restored = result?;
        info!("Restored {} row(s) into {}", restored, TABLE);
        Ok(restored)
    }
}

fn bind_value<'q>(query: Query<'q, Sqlite, SqliteArguments<'q>>, value: &Value) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => query.bind(i),
            None => query.bind(n.as_f64()),
        },
        Value::String(s) => query.bind(s.clone()),
        other => query.bind(other.to_string()),
    }
}

/// Convert a row to JSON using each value's runtime storage class
fn row_to_json(row: &SqliteRow) -> Result<Map<String, Value>, DatabaseError> {
    let mut out = Map::new();
    for (i, column) in row.columns().iter().enumerate() {
        out.insert(column.name().to_string(), extract_column_value(row, i)?);
    }
    Ok(out)
}

fn extract_column_value(row: &SqliteRow, index: usize) -> Result<Value, DatabaseError> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let type_name = raw.type_info().name().to_string();

    match type_name.as_str() {
        "INTEGER" => Ok(Value::from(row.try_get::<i64, _>(index)?)),
        "REAL" => {
            let f: f64 = row.try_get(index)?;
            Ok(Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null))
        }
        "TEXT" => Ok(Value::String(row.try_get::<String, _>(index)?)),
        "BLOB" => {
            let bytes: Vec<u8> = row.try_get(index)?;
            Ok(Value::String(format!("<blob: {} bytes>", bytes.len())))
        }
        other => {
            warn!("Unhandled SQLite storage class: {}, falling back to string", other);
            Ok(Value::String(format!("<unsupported type: {}>", other)))
        }
    }
}

fn into_stored(mut map: Map<String, Value>) -> Result<StoredRecord, DatabaseError> {
    let id = map
        .remove("id")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| DatabaseError::QueryError("row has no integer id".to_string()))?;
    Ok(StoredRecord::new(id, Record::from_stored(map)))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded(dir: &tempfile::TempDir) -> RelationalStore {
        RelationalStore::open(dir.path().join("employees.db"), true).await.unwrap()
    }

    #[tokio::test]
    async fn creates_and_seeds_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded(&dir).await;
        let rows = store.all().await.unwrap();
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0].id, 1);
        assert_eq!(rows[0].record.get("name").and_then(|v| v.as_str()), Some("Amit"));
    }

    #[tokio::test]
    async fn describe_lists_declared_types() {
        let dir = tempfile::tempdir().unwrap();
        let schema: Value = serde_json::from_str(&seeded(&dir).await.describe().await.unwrap()).unwrap();
        assert_eq!(schema["age"], "INTEGER");
        assert_eq!(schema["salary_amount"], "REAL");
    }

    #[tokio::test]
    async fn query_converts_by_storage_class() {
        let dir = tempfile::tempdir().unwrap();
        let rows = seeded(&dir)
            .await
            .query("SELECT name, age, salary_amount, NULL AS nothing FROM employees WHERE id = 1")
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "Amit");
        assert_eq!(rows[0]["age"], 29);
        assert_eq!(rows[0]["salary_amount"].as_f64(), Some(75000.0));
        assert_eq!(rows[0]["nothing"], Value::Null);
    }

    #[tokio::test]
    async fn mutation_snapshots_only_matching_rows() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded(&dir).await;
        let outcome = store
            .execute_mutation(
                "UPDATE employees SET age = age + 1 WHERE department = 'IT'",
                &SnapshotScope::Where { alias: None, selection: "department = 'IT'".to_string() },
            )
            .await
            .unwrap();
        assert_eq!(outcome.rows_affected, 3);
        assert_eq!(outcome.snapshot.len(), 3);
        assert_eq!(outcome.snapshot[0].record.get("age").and_then(|v| v.as_i64()), Some(29));

        store.restore(&outcome.snapshot).await.unwrap();
        let amit = &store.all().await.unwrap()[0];
        assert_eq!(amit.record.get("age").and_then(|v| v.as_i64()), Some(29));
    }

    #[tokio::test]
    async fn failed_mutation_commits_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded(&dir).await;
        let err = store
            .execute_mutation("UPDATE employees SET nope = 1", &SnapshotScope::Table)
            .await;
        assert!(err.is_err());
        assert_eq!(store.all().await.unwrap().len(), 10);
    }

    #[tokio::test]
    async fn aliased_snapshot_resolves_qualified_columns() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded(&dir).await;
        let outcome = store
            .execute_mutation(
                "UPDATE employees AS e SET age = 50 WHERE e.location = 'Pune'",
                &SnapshotScope::Where { alias: Some("e".to_string()), selection: "e.location = 'Pune'".to_string() },
            )
            .await
            .unwrap();
        assert_eq!(outcome.rows_affected, 1);
        assert_eq!(outcome.snapshot.len(), 1);
        assert_eq!(outcome.snapshot[0].record.get("name").and_then(|v| v.as_str()), Some("Raj"));
        assert_eq!(outcome.snapshot[0].record.get("age").and_then(|v| v.as_i64()), Some(35));
    }
}
