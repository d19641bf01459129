//! Database migration command.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string
//!
//! Migrations live in `crates/app/migrations/` and are embedded at build
//! time. The server never runs them on startup.

use super::{CommandError, connect};

/// Run all pending migrations.
///
/// # Errors
///
/// Returns `CommandError` if the connection or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../app/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
