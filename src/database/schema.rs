use sqlx::{PgPool, Row};
use tracing::info;

use super::manager::DatabaseError;

pub const CONTACTS_TABLE: &str = "contacts";

/// DDL for the contacts table. Idempotent.
pub const CREATE_CONTACTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS contacts (
    id VARCHAR(50) PRIMARY KEY,
    first_name VARCHAR(50) NOT NULL CHECK (char_length(first_name) BETWEEN 2 AND 50),
    last_name VARCHAR(50) NOT NULL CHECK (char_length(last_name) BETWEEN 2 AND 50),
    email_primary VARCHAR(100) NOT NULL,
    email_secondary VARCHAR(100),
    phones JSONB NOT NULL,
    address JSONB,
    company JSONB,
    project_ids TEXT[],
    opportunity_ids TEXT[],
    tags TEXT[] CHECK (tags IS NULL OR cardinality(tags) <= 10),
    created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT CURRENT_TIMESTAMP,
    created_by VARCHAR(100) NOT NULL,
    UNIQUE (email_primary, created_by)
)
"#;

pub const CREATE_OWNER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS contacts_created_by_idx ON contacts (created_by, created_at DESC)";

/// Whether the contacts table exists in the public schema
pub async fn table_exists(pool: &PgPool) -> Result<bool, DatabaseError> {
    let row = sqlx::query(
        r#"
        SELECT EXISTS (
            SELECT FROM information_schema.tables
            WHERE table_schema = 'public'
            AND table_name = $1
        ) AS exists
        "#,
    )
    .bind(CONTACTS_TABLE)
    .fetch_one(pool)
    .await?;

    Ok(row.try_get("exists")?)
}

/// Create the contacts table and its indexes if missing
pub async fn initialize(pool: &PgPool) -> Result<(), DatabaseError> {
    sqlx::query(CREATE_CONTACTS_TABLE).execute(pool).await?;
    sqlx::query(CREATE_OWNER_INDEX).execute(pool).await?;
    info!("Database schema initialized");
    Ok(())
}
