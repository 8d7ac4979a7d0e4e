use clap::Subcommand;
use serde_json::Value;

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_empty_collection, output_json, output_success, render_table};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AuditCommands {
    #[command(about = "List audit entries, newest first")]
    List,

    #[command(about = "Undo a mutation by restoring its snapshot")]
    Undo {
        #[arg(help = "Audit entry id")]
        id: u64,
    },
}

pub async fn handle(client: &ApiClient, cmd: AuditCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuditCommands::List => {
            let data = client.get("/api/audit", &[]).await?;
            let entries = data.as_array().cloned().unwrap_or_default();
            if entries.is_empty() {
                return output_empty_collection(output_format, "audit", "No audit entries yet.");
            }
            match output_format {
                OutputFormat::Json => output_json(&data),
                OutputFormat::Text => {
                    // Snapshots can be large; the table shows whether one exists
                    let rows: Vec<Value> = entries.into_iter().map(summarize_entry).collect();
                    print!("{}", render_table(&rows));
                    Ok(())
                }
            }
        }
        AuditCommands::Undo { id } => {
            let data = client.post::<Value>(&format!("/api/audit/undo/{}", id), None).await?;
            let restored = data.get("restored").and_then(Value::as_u64).unwrap_or(0);
            let message = format!("Undid audit entry #{} ({} record(s) restored)", id, restored);
            output_success(output_format, &message, Some(data))
        }
    }
}

fn summarize_entry(mut entry: Value) -> Value {
    if let Some(obj) = entry.as_object_mut() {
        let has_snapshot = obj
            .remove("snapshot")
            .map(|s| s.as_array().map(|a| !a.is_empty()).unwrap_or(false))
            .unwrap_or(false);
        let undone = obj.remove("undone").and_then(|u| u.as_bool()).unwrap_or(false);
        obj.insert("undoable".to_string(), Value::Bool(has_snapshot && !undone));
    }
    entry
}
