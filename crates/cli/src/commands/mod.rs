//! CLI command implementations.

pub mod invite;
pub mod migrate;
pub mod profile;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use storecast_app::db::RepositoryError;
use storecast_app::services::AccountError;

/// Errors shared by the CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Invalid command argument.
    #[error("{0}")]
    InvalidArgument(String),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Account error: {0}")]
    Account(#[from] AccountError),

    /// The primary step of a multi-step change failed.
    #[error("{operation} failed: {error}")]
    StepFailed {
        operation: &'static str,
        error: String,
    },
}

/// Read a required environment variable, loading `.env` first.
pub(crate) fn required_env(name: &'static str) -> Result<String, CommandError> {
    dotenvy::dotenv().ok();
    std::env::var(name).map_err(|_| CommandError::MissingEnvVar(name))
}

/// Connect to the database named by `DATABASE_URL`.
pub(crate) async fn connect() -> Result<PgPool, CommandError> {
    let url = SecretString::from(required_env("DATABASE_URL")?);
    tracing::info!("Connecting to database...");
    Ok(storecast_app::db::create_pool(&url).await?)
}
