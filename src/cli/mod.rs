pub mod client;
pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::types::{DbType, Mode, Role};

#[derive(Parser)]
#[command(name = "datasense")]
#[command(about = "DataSense CLI - ask questions of the employee data in plain language")]
#[command(version)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "DATASENSE_URL",
        default_value = "http://localhost:8000",
        help = "Base URL of the DataSense API"
    )]
    pub server: String,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run a natural-language query or mutation")]
    Query {
        #[arg(help = "What to ask, in plain language")]
        prompt: String,
        #[arg(long, default_value = "nosql", help = "Target store (nosql or sql)")]
        db: DbType,
        #[arg(long, default_value = "query", help = "query or mutation")]
        mode: Mode,
        #[arg(long, default_value = "Viewer", help = "Caller role (Admin or Viewer)")]
        role: Role,
    },

    #[command(about = "Audit trail and undo")]
    Audit {
        #[command(subcommand)]
        cmd: commands::audit::AuditCommands,
    },

    #[command(about = "Show the schema description of a store")]
    Schema {
        #[arg(long, default_value = "nosql", help = "Target store (nosql or sql)")]
        db: DbType,
    },

    #[command(about = "List every record in a store")]
    Records {
        #[arg(long, default_value = "nosql", help = "Target store (nosql or sql)")]
        db: DbType,
    },

    #[command(about = "Check server health")]
    Health,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let client = client::ApiClient::new(&cli.server)?;

    match cli.command {
        Commands::Query { prompt, db, mode, role } => {
            commands::query::handle(&client, prompt, db, mode, role, output_format).await
        }
        Commands::Audit { cmd } => commands::audit::handle(&client, cmd, output_format).await,
        Commands::Schema { db } => commands::store::schema(&client, db, output_format).await,
        Commands::Records { db } => commands::store::records(&client, db, output_format).await,
        Commands::Health => commands::store::health(&client, output_format).await,
    }
}
