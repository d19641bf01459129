//! Account role commands.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string

use storecast_app::db::{IdentityRecords, IdentityRepository, ProfileRepository};
use storecast_app::services::AccountService;
use storecast_core::{Email, Role};

use super::{CommandError, connect};

/// Set the role of the account registered under `email`.
///
/// Runs the same two steps as the admin console: the app role claim, then
/// the profile. A failed profile update is logged and does not fail the
/// command.
///
/// # Errors
///
/// Returns `CommandError` for an unknown account or a failed claim update.
pub async fn set_role(email: &str, role: Role) -> Result<(), CommandError> {
    let email = Email::parse(email).map_err(|e| CommandError::InvalidArgument(e.to_string()))?;
    let pool = connect().await?;

    let identities = IdentityRepository::new(&pool);
    let profiles = ProfileRepository::new(&pool);

    let identity = identities
        .find_by_email(&email)
        .await?
        .ok_or_else(|| CommandError::InvalidArgument(format!("No account for {email}")))?;

    tracing::info!("Setting role of {} to {}", email, role);
    let log = AccountService::new(&identities, &profiles)
        .set_role(identity.id, role)
        .await?;

    if !log.succeeded() {
        return Err(CommandError::StepFailed {
            operation: "set_role",
            error: log.primary_error().unwrap_or("unknown error").to_owned(),
        });
    }
    for warning in log.warnings() {
        tracing::warn!("Step {} failed; the profile may be stale until next sign-in", warning);
    }

    tracing::info!("Role updated");
    Ok(())
}
