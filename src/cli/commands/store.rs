use serde_json::Value;

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_empty_collection, output_json, render_table};
use crate::cli::OutputFormat;
use crate::types::DbType;

pub async fn schema(client: &ApiClient, db_type: DbType, output_format: OutputFormat) -> anyhow::Result<()> {
    let data = client.get("/api/schema", &[("db_type", db_type.as_str())]).await?;
    match output_format {
        OutputFormat::Json => output_json(&data),
        OutputFormat::Text => {
            let source = data.get("source").and_then(Value::as_str).unwrap_or(db_type.label());
            println!("Schema ({}):", source);
            println!("{}", data.get("schema").and_then(Value::as_str).unwrap_or_default());
            Ok(())
        }
    }
}

pub async fn records(client: &ApiClient, db_type: DbType, output_format: OutputFormat) -> anyhow::Result<()> {
    let data = client.get("/api/records", &[("db_type", db_type.as_str())]).await?;
    let rows = data.as_array().cloned().unwrap_or_default();
    if rows.is_empty() {
        return output_empty_collection(output_format, "records", "No records.");
    }
    match output_format {
        OutputFormat::Json => output_json(&data),
        OutputFormat::Text => {
            print!("{}", render_table(&rows));
            println!("({} record(s) in {})", rows.len(), db_type.label());
            Ok(())
        }
    }
}

pub async fn health(client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    let data = client.get("/api/health", &[]).await?;
    match output_format {
        OutputFormat::Json => output_json(&data),
        OutputFormat::Text => {
            println!("Server: {}", client.url(""));
            println!("Status: {}", data.get("status").and_then(Value::as_str).unwrap_or("unknown"));
            for key in ["nosql", "sql"] {
                if let Some(location) = data.get(key).and_then(Value::as_str) {
                    println!("{}: {}", key, location);
                }
            }
            Ok(())
        }
    }
}
