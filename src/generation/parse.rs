use serde_json::{json, Value};

use super::error::GenerationError;
use crate::executor::{MutationRequest, ReadQuery};
use crate::types::{DbType, Mode};

/// A generator response, parsed for the backend and mode it was asked for
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedQuery {
    Sql(String),
    Read(ReadQuery),
    Mutation(MutationRequest),
}

impl GeneratedQuery {
    pub fn parse(raw: &str, db_type: DbType, mode: Mode) -> Result<Self, GenerationError> {
        let content = strip_fences(raw);
        if content.is_empty() {
            return Err(GenerationError::EmptyOutput);
        }

        match (db_type, mode) {
            (DbType::Sql, _) => Ok(GeneratedQuery::Sql(content.to_string())),
            (DbType::Nosql, Mode::Query) => {
                let value = parse_object(content)?;
                Ok(GeneratedQuery::Read(serde_json::from_value(value)?))
            }
            (DbType::Nosql, Mode::Mutation) => {
                let value = parse_object(content)?;
                match value.get("method").and_then(Value::as_str) {
                    Some("insert" | "update" | "delete") => Ok(GeneratedQuery::Mutation(serde_json::from_value(value)?)),
                    Some(other) => Err(GenerationError::UnknownMethod(other.to_string())),
                    None => Err(GenerationError::UnknownMethod(String::new())),
                }
            }
        }
    }

    /// Shape returned to API callers as `generated_query`
    pub fn to_json(&self) -> Value {
        match self {
            GeneratedQuery::Sql(sql) => json!({ "sql": sql }),
            GeneratedQuery::Read(read) => serde_json::to_value(read).unwrap_or(Value::Null),
            GeneratedQuery::Mutation(mutation) => serde_json::to_value(mutation).unwrap_or(Value::Null),
        }
    }

    /// Text stored in the audit log for the execution step
    pub fn render(&self) -> String {
        match self {
            GeneratedQuery::Sql(sql) => sql.clone(),
            other => other.to_json().to_string(),
        }
    }
}

fn parse_object(content: &str) -> Result<Value, GenerationError> {
    let value: Value = serde_json::from_str(content)?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(GenerationError::NotAnObject(value.to_string()))
    }
}

/// Return the body of the first markdown code fence, or the trimmed text
/// when there is none. The fence's language tag is dropped.
pub fn strip_fences(raw: &str) -> &str {
    let text = raw.trim();
    let Some(start) = text.find("```") else {
        return text;
    };
    let after_open = &text[start + 3..];
    // Skip the language tag on the opening line
    let body = match after_open.find('\n') {
        Some(nl) if !after_open[..nl].trim().contains(' ') => &after_open[nl + 1..],
        _ => after_open,
    };
    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}
