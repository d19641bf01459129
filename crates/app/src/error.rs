//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. Page handlers return `Result<T, AppError>`;
//! action handlers convert it into an [`crate::response::ActionResult`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{AccountError, AuthError, ContentError, StorageError};

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Object storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Content upload/delete failed.
    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    /// Account change failed before any step ran.
    #[error("Account error: {0}")]
    Account(#[from] AccountError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User is authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Database(RepositoryError::AccessDenied) | Self::Forbidden(_) => {
                StatusCode::FORBIDDEN
            }
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Storage(_) => StatusCode::BAD_GATEWAY,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                _ => StatusCode::BAD_REQUEST,
            },
            Self::Content(err) => match err {
                ContentError::NotFound => StatusCode::NOT_FOUND,
                ContentError::StoreNotOwned => StatusCode::FORBIDDEN,
                ContentError::NoStores | ContentError::Invalid(_) => StatusCode::BAD_REQUEST,
                ContentError::Storage(_) => StatusCode::BAD_GATEWAY,
                ContentError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Account(err) => match err {
                AccountError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                AccountError::NotFound => StatusCode::NOT_FOUND,
                AccountError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to show to the client.
    ///
    /// Internal details are never exposed for server errors.
    #[must_use]
    pub fn public_message(&self) -> String {
        if self.status().is_server_error() {
            return match self {
                Self::Storage(_) | Self::Content(ContentError::Storage(_)) => {
                    "File storage is unavailable".to_string()
                }
                _ => "Internal server error".to_string(),
            };
        }

        match self {
            Self::Database(RepositoryError::Conflict(msg)) => capitalize(msg),
            Self::Database(RepositoryError::NotFound) => "Not found".to_string(),
            Self::Database(_) => "Access denied".to_string(),
            Self::Auth(err) => err.user_message(),
            Self::Content(err) => capitalize(&err.to_string()),
            Self::Account(AccountError::InvalidEmail(_)) => "Invalid email address".to_string(),
            Self::Account(_) => "Account not found".to_string(),
            Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::BadRequest(msg)
            | Self::Internal(msg) => msg.clone(),
            Self::Storage(_) => "File storage is unavailable".to_string(),
        }
    }

    /// Capture server errors to Sentry and log them.
    pub fn report(&self) {
        if self.status().is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }
    }
}

fn capitalize(msg: &str) -> String {
    let mut chars = msg.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + chars.as_str()
    })
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.report();
        (self.status(), self.public_message()).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("store".to_string());
        assert_eq!(err.to_string(), "Not found: store");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::Conflict("x".to_string()))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Content(ContentError::NoStores)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_server_errors_hide_details() {
        let err = AppError::Database(RepositoryError::DataCorruption("secret row".to_string()));
        assert_eq!(err.public_message(), "Internal server error");

        let conflict = AppError::Database(RepositoryError::Conflict(
            "store still has content".to_string(),
        ));
        assert_eq!(conflict.public_message(), "Store still has content");
    }
}
