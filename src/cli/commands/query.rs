use serde_json::Value;

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_json, render_table};
use crate::cli::OutputFormat;
use crate::engine::QueryRequest;
use crate::types::{DbType, Mode, Role};

pub async fn handle(
    client: &ApiClient,
    prompt: String,
    db_type: DbType,
    mode: Mode,
    role: Role,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let request = QueryRequest::new(prompt, role, mode, db_type);
    let data = client.post("/api/query", Some(&request)).await?;

    if let OutputFormat::Json = output_format {
        return output_json(&data);
    }

    let label = data.get("db_label").and_then(Value::as_str).unwrap_or(db_type.label());
    println!("[{}] generated query:", label);
    match data.get("generated_query") {
        Some(Value::Object(q)) if q.len() == 1 && q.contains_key("sql") => {
            println!("  {}", q["sql"].as_str().unwrap_or_default());
        }
        Some(q) => println!("  {}", q),
        None => {}
    }

    if let Some(message) = data.get("message").and_then(Value::as_str) {
        println!("✓ {}", message);
    }

    let results = data.get("results").and_then(Value::as_array).cloned().unwrap_or_default();
    if results.is_empty() {
        println!("No results.");
    } else {
        println!();
        print!("{}", render_table(&results));
        println!("({} row(s))", results.len());
    }

    if let Some(insights) = data.get("insights").and_then(Value::as_str) {
        if !insights.is_empty() {
            println!();
            println!("Insights: {}", insights);
        }
    }

    if let Some(id) = data.get("audit_id").and_then(Value::as_u64) {
        println!("Audit entry #{}", id);
    }
    Ok(())
}
