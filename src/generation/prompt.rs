use serde_json::Value;

use crate::types::{DbType, Mode};

/// Everything the generator needs to translate one request
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub schema: String,
    pub mode: Mode,
    pub db_type: DbType,
}

const DOCUMENT_READ_TASK: &str = r#"Return a MongoDB-style read query JSON:
{
  "filter": {},          // field conditions: use $gt, $lt, $gte, $lte, $ne, $in, $nin, $regex
  "sort": "field_name"   // optional, "field desc" for descending
}"#;

const DOCUMENT_MUTATION_TASK: &str = r#"Return JSON with:
  "method": "insert" | "update" | "delete"
  "filter": {} (for update/delete: which docs to target)
  "update": {} (for update: new field values, or {"$inc": n}, {"$mul": n}, {"$expr": "current * 1.1"})
  "document": {} (for insert: the new document fields)"#;

const SQL_READ_TASK: &str = "Generate a single SQLite SELECT statement.\nReturn ONLY the SQL. No markdown.";

const SQL_MUTATION_TASK: &str = "Generate a single SQLite DML statement: INSERT INTO, UPDATE ... SET ... WHERE, or DELETE FROM ... WHERE.\nReturn ONLY the SQL. No markdown.";

impl GenerationRequest {
    pub fn render(&self) -> String {
        match self.db_type {
            DbType::Nosql => {
                let task = match self.mode {
                    Mode::Query => DOCUMENT_READ_TASK,
                    Mode::Mutation => DOCUMENT_MUTATION_TASK,
                };
                format!(
                    "You are a NoSQL assistant for a JSON document collection.\nSchema:\n{}\n\nTask: {}\n\nUser request: \"{}\"\n\nReturn ONLY valid JSON. No markdown. No explanation.",
                    self.schema, task, self.prompt
                )
            }
            DbType::Sql => {
                let task = match self.mode {
                    Mode::Query => SQL_READ_TASK,
                    Mode::Mutation => SQL_MUTATION_TASK,
                };
                format!(
                    "You are a SQLite SQL expert.\nTable: employees\nSchema (column -> type):\n{}\n\nTask: {}\n\nUser request: \"{}\"\n\nSQL:",
                    self.schema, task, self.prompt
                )
            }
        }
    }
}

/// Prompt asking for three insights over a result sample
pub fn insights_prompt(prompt: &str, results: &[Value]) -> String {
    let sample: Vec<&Value> = results.iter().take(2).collect();
    let sample = serde_json::to_string(&sample).unwrap_or_default();
    format!(
        "You are a Data Analyst.\nUser Query: \"{}\"\nData Results Count: {}\nSample Data: {}\n\nProvide 3 concise bullet-point insights. Focus only on the data.",
        prompt,
        results.len(),
        sample
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sql_mutation_prompt_asks_for_dml() {
        let request = GenerationRequest {
            prompt: "give IT a raise".into(),
            schema: "{}".into(),
            mode: Mode::Mutation,
            db_type: DbType::Sql,
        };
        let text = request.render();
        assert!(text.contains("DML"));
        assert!(text.contains("give IT a raise"));
    }

    #[test]
    fn insights_prompt_samples_two_rows() {
        let rows = vec![json!({"n": 1}), json!({"n": 2}), json!({"n": 3})];
        let text = insights_prompt("q", &rows);
        assert!(text.contains("Data Results Count: 3"));
        assert!(!text.contains("\"n\":3"));
    }
}
