//! Route guard for the protected areas.
//!
//! `/dashboard` and `/admin` (and everything below them) require a session
//! and a profile with the right role. Every failure redirects to the
//! sign-in page for the area; nothing degrades to a pass-through.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use storecast_core::Role;

use crate::db::ProfileStore;
use crate::models::{CurrentUser, SessionIdentity, session_keys};
use crate::services::resolver::access_for;
use crate::state::AppState;

pub const CLIENT_SIGNIN: &str = "/auth/client/signin";
pub const ADMIN_SIGNIN: &str = "/auth/admin/signin";

/// Query parameter an admin uses to view a client's dashboard.
pub const ADMIN_VIEW_PARAM: &str = "admin_view";

/// Protected path prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Area {
    Dashboard,
    Admin,
}

impl Area {
    /// The protected area a path belongs to, if any.
    #[must_use]
    pub fn of(path: &str) -> Option<Self> {
        let under = |prefix: &str| {
            path.strip_prefix(prefix)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        };
        if under("/dashboard") {
            Some(Self::Dashboard)
        } else if under("/admin") {
            Some(Self::Admin)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn signin(self) -> &'static str {
        match self {
            Self::Dashboard => CLIENT_SIGNIN,
            Self::Admin => ADMIN_SIGNIN,
        }
    }
}

/// Outcome of the guard for one request.
#[derive(Debug, Clone)]
pub enum GuardDecision {
    /// Not a protected path.
    Pass,
    /// Protected path, caller authorized.
    Allow(CurrentUser),
    /// Send the caller to this sign-in page.
    Redirect(&'static str),
}

/// Value of `admin_view` in a query string, if present and non-empty.
#[must_use]
pub fn admin_view_param(query: Option<&str>) -> Option<String> {
    url::form_urlencoded::parse(query.unwrap_or_default().as_bytes())
        .find(|(key, value)| key == ADMIN_VIEW_PARAM && !value.trim().is_empty())
        .map(|(_, value)| value.trim().to_owned())
}

/// Decide whether a request may proceed.
///
/// `/admin` requires the admin role. `/dashboard` admits clients, and admins
/// only when they carry `admin_view` (viewing a client's dashboard).
pub async fn authorize<P>(
    path: &str,
    query: Option<&str>,
    identity: Option<&SessionIdentity>,
    profiles: &P,
) -> GuardDecision
where
    P: ProfileStore + ?Sized,
{
    let Some(area) = Area::of(path) else {
        return GuardDecision::Pass;
    };
    let Some(identity) = identity else {
        return GuardDecision::Redirect(area.signin());
    };

    let profile = match profiles.find(identity.id, access_for(identity)).await {
        Ok(Some(profile)) => profile,
        Ok(None) => {
            tracing::warn!(profile_id = %identity.id, "No profile for session, redirecting");
            return GuardDecision::Redirect(area.signin());
        }
        Err(e) => {
            tracing::error!(
                profile_id = %identity.id,
                error = %e,
                "Profile lookup failed in guard"
            );
            return GuardDecision::Redirect(area.signin());
        }
    };

    let allowed = match (area, profile.role) {
        (Area::Admin, role) => role == Role::Admin,
        (Area::Dashboard, Role::Client) => true,
        (Area::Dashboard, Role::Admin) => admin_view_param(query).is_some(),
    };

    if allowed {
        GuardDecision::Allow(CurrentUser {
            identity: identity.clone(),
            profile,
        })
    } else {
        GuardDecision::Redirect(area.signin())
    }
}

/// The area home an already signed-in caller would be admitted to, if any.
///
/// Only a stored profile counts: a missing profile or a failed lookup has no
/// home, so the sign-in page renders instead of bouncing back into the guard.
pub async fn signed_in_home<P>(
    identity: &SessionIdentity,
    profiles: &P,
) -> Option<&'static str>
where
    P: ProfileStore + ?Sized,
{
    match profiles.find(identity.id, access_for(identity)).await {
        Ok(Some(profile)) if profile.role.is_admin() => Some("/admin"),
        Ok(Some(_)) => Some("/dashboard"),
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(
                profile_id = %identity.id,
                error = %e,
                "Profile lookup failed on sign-in page"
            );
            None
        }
    }
}

/// Axum middleware running [`authorize`]. Authorized requests carry the
/// [`CurrentUser`] in their extensions.
pub async fn route_guard(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    let identity: Option<SessionIdentity> = session
        .get(session_keys::IDENTITY)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Session read failed in guard");
            None
        });

    let path = request.uri().path().to_owned();
    let query = request.uri().query().map(str::to_owned);
    let decision = authorize(
        &path,
        query.as_deref(),
        identity.as_ref(),
        &state.profiles(),
    )
    .await;

    match decision {
        GuardDecision::Pass => next.run(request).await,
        GuardDecision::Allow(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        GuardDecision::Redirect(to) => Redirect::to(to).into_response(),
    }
}
