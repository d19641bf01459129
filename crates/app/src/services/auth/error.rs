//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] storecast_core::EmailError),

    /// Invalid credentials (wrong password or identity not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Identity already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// New password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Invite is unknown, used, or expired.
    #[error("invite is invalid or has expired")]
    InvalidInvite,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Message safe to show on a form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Repository(_) | Self::PasswordHash => {
                "Something went wrong. Please try again.".to_owned()
            }
            Self::InvalidCredentials => "Invalid email or password".to_owned(),
            Self::UserAlreadyExists => "An account with this email already exists".to_owned(),
            other => {
                let msg = other.to_string();
                let mut chars = msg.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_uppercase().collect::<String>() + chars.as_str()
                })
            }
        }
    }
}
