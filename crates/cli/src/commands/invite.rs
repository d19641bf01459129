//! Invite commands.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `STORECAST_BASE_URL` - Base URL for acceptance links
//! - `STORECAST_INVITE_TTL_HOURS` - Invite lifetime (default 168)

use storecast_app::db::{IdentityRecords, IdentityRepository, InviteRepository};
use storecast_app::services::invites::{acceptance_url, generate_token};
use storecast_core::{Email, Role};

use super::{CommandError, connect, required_env};

const DEFAULT_TTL_HOURS: i64 = 168;

fn parse_role(raw: &str) -> Result<Role, CommandError> {
    raw.parse().map_err(|_| {
        CommandError::InvalidArgument(format!("Invalid role: {raw}. Valid roles: client, admin"))
    })
}

fn ttl_hours() -> Result<i64, CommandError> {
    match std::env::var("STORECAST_INVITE_TTL_HOURS") {
        Ok(raw) => raw
            .parse()
            .ok()
            .filter(|hours: &i64| *hours > 0)
            .ok_or_else(|| {
                CommandError::InvalidArgument(format!(
                    "STORECAST_INVITE_TTL_HOURS must be a positive integer, got {raw}"
                ))
            }),
        Err(_) => Ok(DEFAULT_TTL_HOURS),
    }
}

/// Create an invite and return its acceptance URL.
///
/// # Errors
///
/// Returns `CommandError` for a bad email or role, an email that already
/// has an account, or a database failure.
pub async fn create(email: &str, role: &str) -> Result<String, CommandError> {
    let email = Email::parse(email).map_err(|e| CommandError::InvalidArgument(e.to_string()))?;
    let role = parse_role(role)?;
    let base_url = required_env("STORECAST_BASE_URL")?;
    let ttl = ttl_hours()?;
    let pool = connect().await?;

    if IdentityRepository::new(&pool)
        .find_by_email(&email)
        .await?
        .is_some()
    {
        return Err(CommandError::InvalidArgument(format!(
            "An account already exists for {email}"
        )));
    }

    let token = generate_token();
    let invite = InviteRepository::new(&pool)
        .create(&email, role, &token, None, ttl)
        .await?;

    tracing::info!(
        "Invite created for {} ({}), expires {}",
        invite.email,
        invite.role,
        invite.expires_at
    );
    Ok(acceptance_url(&base_url, &invite.token))
}
