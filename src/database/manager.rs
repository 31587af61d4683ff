use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the store layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Duplicate key: {0}")]
    Conflict(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        // 23505 = unique_violation
        if let sqlx::Error::Database(db) = &err {
            if db.code().as_deref() == Some("23505") {
                return DatabaseError::Conflict(db.message().to_string());
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Connection pool construction and maintenance for the PostgreSQL store
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open a pool against `database.url`.
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let connection_string = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let target = Self::describe_target(connection_string)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(connection_string)
            .await?;

        info!("Connected to PostgreSQL at {}", target);
        Ok(pool)
    }

    /// Apply the bundled migrations.
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    /// Host, port and database name of a connection string, without
    /// credentials, for log lines.
    fn describe_target(connection_string: &str) -> Result<String, DatabaseError> {
        let url = url::Url::parse(connection_string).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        let host = url.host_str().ok_or(DatabaseError::InvalidDatabaseUrl)?;
        let port = url.port().unwrap_or(5432);
        Ok(format!("{}:{}{}", host, port, url.path()))
    }
}
