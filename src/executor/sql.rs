use sqlparser::ast::{Expr, FromTable, Statement, TableFactor, TableWithJoins};
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;

use crate::database::relational::TABLE;
use crate::database::SnapshotScope;

/// What a generated SQL statement does, as far as snapshotting cares
#[derive(Debug, Clone, PartialEq)]
pub enum SqlStatementKind {
    Select,
    Insert,
    /// Carries the rows the statement can touch
    Update(SnapshotScope),
    Delete(SnapshotScope),
    /// Parsed, but neither a query nor row DML (DDL, PRAGMA, ...)
    Other(String),
    /// More than one statement
    Batch(usize),
    Unparsed,
}

impl SqlStatementKind {
    pub fn classify(sql: &str) -> Self {
        let statements = match Parser::parse_sql(&SQLiteDialect {}, sql) {
            Ok(statements) => statements,
            Err(e) => {
                tracing::debug!("SQL not parseable, treating as opaque: {}", e);
                return SqlStatementKind::Unparsed;
            }
        };
        let [statement] = statements.as_slice() else {
            return SqlStatementKind::Batch(statements.len());
        };

        match statement {
            Statement::Query(_) => SqlStatementKind::Select,
            Statement::Insert(_) => SqlStatementKind::Insert,
            Statement::Update { table, from, selection, .. } => {
                let target = if from.is_none() { Some(table) } else { None };
                SqlStatementKind::Update(where_scope(target, selection.as_ref()))
            }
            Statement::Delete(delete) => {
                let target = match &delete.from {
                    FromTable::WithFromKeyword(tables) | FromTable::WithoutKeyword(tables)
                        if tables.len() == 1 && delete.tables.is_empty() && delete.using.is_none() =>
                    {
                        tables.first()
                    }
                    _ => None,
                };
                SqlStatementKind::Delete(where_scope(target, delete.selection.as_ref()))
            }
            other => SqlStatementKind::Other(statement_name(other)),
        }
    }

    /// True when the statement may run in read mode
    pub fn is_read(&self) -> bool {
        matches!(self, SqlStatementKind::Select | SqlStatementKind::Unparsed)
    }

    /// Rows to capture before executing this statement as a mutation.
    /// Anything not recognised as row DML falls back to the whole table.
    pub fn snapshot_scope(&self) -> SnapshotScope {
        match self {
            SqlStatementKind::Insert => SnapshotScope::None,
            SqlStatementKind::Update(scope) | SqlStatementKind::Delete(scope) => scope.clone(),
            _ => SnapshotScope::Table,
        }
    }
}

/// Leading keyword, upper-cased, for result messages
pub fn statement_verb(sql: &str) -> String {
    sql.split_whitespace().next().unwrap_or("SQL").to_uppercase()
}

/// Scope a snapshot by the statement's own WHERE when it targets the plain
/// employee table, aliased or not. Joins, extra FROM sources, other tables and
/// column-list aliases all take the whole table.
fn where_scope(target: Option<&TableWithJoins>, selection: Option<&Expr>) -> SnapshotScope {
    let (Some(target), Some(selection)) = (target, selection) else {
        return SnapshotScope::Table;
    };
    if !target.joins.is_empty() {
        return SnapshotScope::Table;
    }
    let TableFactor::Table { name, alias, .. } = &target.relation else {
        return SnapshotScope::Table;
    };
    if !name.0.last().is_some_and(|ident| ident.value.eq_ignore_ascii_case(TABLE)) {
        return SnapshotScope::Table;
    }
    let alias = match alias {
        None => None,
        Some(alias) if alias.columns.is_empty() => Some(alias.name.to_string()),
        Some(_) => return SnapshotScope::Table,
    };
    SnapshotScope::Where { alias, selection: selection.to_string() }
}

fn statement_name(statement: &Statement) -> String {
    let text = statement.to_string();
    statement_verb(&text)
}
