//! CLI subcommand implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;

/// Errors common to the CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Password hashing failed")]
    PasswordHash,
}

/// Connect to the store database named by `AWE_DATABASE_URL`.
pub async fn connect() -> Result<MySqlPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("AWE_DATABASE_URL")
        .map_err(|_| CommandError::MissingEnvVar("AWE_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = MySqlPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await?;

    Ok(pool)
}
