use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::DatabaseConfig;

/// Errors from the database layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Builds the shared connection pool from configuration
pub struct DatabaseManager;

impl DatabaseManager {
    /// Create a pool, retrying until the database accepts connections
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let options = Self::connect_options(config)?;
        let max_attempts = config.init_max_attempts.max(1);
        let delay = Duration::from_secs(config.init_retry_delay_secs);

        let mut attempt = 1;
        loop {
            let result = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .acquire_timeout(Duration::from_secs(config.connection_timeout))
                .connect_with(options.clone())
                .await;

            match result {
                Ok(pool) => {
                    info!("Database connection established (attempt {}/{})", attempt, max_attempts);
                    return Ok(pool);
                }
                Err(e) if attempt < max_attempts => {
                    warn!("Database connection attempt {}/{} failed: {}", attempt, max_attempts, e);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(DatabaseError::ConnectionError(format!(
                        "could not connect to database after {} attempts: {}",
                        max_attempts, e
                    )));
                }
            }
        }
    }

    fn connect_options(config: &DatabaseConfig) -> Result<PgConnectOptions, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let options = PgConnectOptions::from_str(url)
            .map_err(|e| DatabaseError::ConnectionError(format!("invalid DATABASE_URL: {}", e)))?;

        // Production databases sit behind TLS with provider-managed certificates
        Ok(if config.require_ssl {
            options.ssl_mode(PgSslMode::Require)
        } else {
            options
        })
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }
}
