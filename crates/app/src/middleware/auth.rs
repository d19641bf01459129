//! Authentication extractors and session helpers.
//!
//! The route guard resolves the caller for protected paths and stores the
//! [`CurrentUser`] in the request extensions; these extractors read it.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use super::guard::{ADMIN_SIGNIN, CLIENT_SIGNIN};
use crate::models::{CurrentUser, SessionIdentity, session_keys};

/// Error returned when an extractor's requirement is not met.
pub enum AuthRejection {
    /// Redirect to a sign-in page (for HTML requests).
    Redirect(&'static str),
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Redirect(to) => Redirect::to(to).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

fn reject(parts: &Parts, signin: &'static str) -> AuthRejection {
    if parts.uri.path().contains("/api/") {
        AuthRejection::Unauthorized
    } else {
        AuthRejection::Redirect(signin)
    }
}

/// Extractor for any authorized caller of a `/dashboard` route.
pub struct RequireUser(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .map(Self)
            .ok_or_else(|| reject(parts, CLIENT_SIGNIN))
    }
}

/// Extractor that requires the admin role.
pub struct RequireAdmin(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .filter(|user| user.is_admin())
            .cloned()
            .map(Self)
            .ok_or_else(|| reject(parts, ADMIN_SIGNIN))
    }
}

/// Extractor for the session identity, if signed in.
pub struct OptionalIdentity(pub Option<SessionIdentity>);

impl<S> FromRequestParts<S> for OptionalIdentity
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<SessionIdentity>(session_keys::IDENTITY)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(identity))
    }
}

/// Store the signed-in identity, rotating the session id.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
pub async fn set_session_identity(
    session: &Session,
    identity: &SessionIdentity,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::IDENTITY, identity).await
}

/// Clear the session.
///
/// # Errors
///
/// Returns an error if the session cannot be flushed.
pub async fn clear_session_identity(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
