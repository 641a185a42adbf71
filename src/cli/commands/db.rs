use clap::Subcommand;
use serde_json::json;

use crate::cli::output::{output_error, output_fields, output_success};
use crate::cli::OutputFormat;
use crate::config;
use crate::database::{schema, DatabaseManager};

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Create the contacts schema if it does not exist")]
    Init,

    #[command(about = "Show database connectivity and schema state")]
    Status,
}

pub async fn handle(cmd: DbCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        DbCommands::Init => init(output_format).await,
        DbCommands::Status => status(output_format).await,
    }
}

async fn init(output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config::config().database).await?;

    if schema::table_exists(&pool).await? {
        output_success(
            output_format,
            "Contacts table already exists, skipping initialization",
            Some(json!({ "created": false })),
        )?;
        return Ok(());
    }

    schema::initialize(&pool).await?;

    if !schema::table_exists(&pool).await? {
        output_error(output_format, "Schema verification failed after initialization", Some("SCHEMA_MISSING"))?;
        anyhow::bail!("contacts table missing after initialization");
    }

    output_success(
        output_format,
        "Database schema initialized",
        Some(json!({ "created": true })),
    )
}

async fn status(output_format: OutputFormat) -> anyhow::Result<()> {
    let db_config = &config::config().database;

    let pool = match DatabaseManager::connect(db_config).await {
        Ok(pool) => pool,
        Err(e) => {
            output_error(output_format, &format!("Database unreachable: {}", e), Some("CONNECTION_ERROR"))?;
            anyhow::bail!("database unreachable");
        }
    };

    DatabaseManager::health_check(&pool).await?;
    let table = schema::table_exists(&pool).await?;

    output_fields(
        output_format,
        &json!({
            "database": "ok",
            "contacts_table": if table { "present" } else { "missing" },
            "max_connections": db_config.max_connections,
            "require_ssl": db_config.require_ssl,
        }),
    )
}
