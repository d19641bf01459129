//! Authentication route handlers.
//!
//! Password sign-in for the client and admin areas, client self sign-up,
//! invite acceptance, and sign-out. Failures redirect back to the form with
//! an `?error=` code.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::middleware::guard::{ADMIN_SIGNIN, CLIENT_SIGNIN, signed_in_home};
use crate::middleware::{OptionalIdentity, clear_session_identity, set_session_identity};
use crate::models::{CurrentUser, Identity};
use crate::services::{AuthError, AuthService, resolve_current_user};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Sign-in form data.
#[derive(Debug, Deserialize)]
pub struct SigninForm {
    pub email: String,
    pub password: String,
}

/// Sign-up form data.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// Invite acceptance form data.
#[derive(Debug, Deserialize)]
pub struct InviteForm {
    pub password: String,
    pub password_confirm: String,
}

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Sign-in page, shared by both areas.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signin.html")]
pub struct SigninTemplate {
    pub heading: String,
    pub action: String,
    pub error: Option<String>,
    pub show_signup: bool,
}

/// Client sign-up page.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub error: Option<String>,
}

/// Invite acceptance page.
#[derive(Template, WebTemplate)]
#[template(path = "auth/invite.html")]
pub struct InviteTemplate {
    pub token: String,
    pub email: Option<String>,
    pub role: String,
    pub error: Option<String>,
}

// =============================================================================
// Error codes
// =============================================================================

fn error_code(err: &AuthError) -> &'static str {
    match err {
        AuthError::InvalidCredentials => "credentials",
        AuthError::InvalidEmail(_) => "invalid_email",
        AuthError::UserAlreadyExists => "exists",
        AuthError::WeakPassword(_) => "weak_password",
        AuthError::PasswordMismatch => "mismatch",
        AuthError::InvalidInvite => "invite",
        AuthError::Repository(_) | AuthError::PasswordHash => "failed",
    }
}

/// Message for an `?error=` code. Unknown codes show nothing.
fn error_message(code: Option<&str>) -> Option<String> {
    let message = match code? {
        "credentials" => "Invalid email or password",
        "invalid_email" => "Please enter a valid email address",
        "exists" => "An account with this email already exists",
        "weak_password" => "Password must be at least 8 characters",
        "mismatch" => "Passwords do not match",
        "invite" => "This invite is invalid or has expired",
        "not_admin" => "This account does not have admin access",
        "session" | "failed" => "Something went wrong. Please try again.",
        _ => return None,
    };
    Some(message.to_owned())
}

fn back_to(page: &str, code: &str) -> Response {
    Redirect::to(&format!("{page}?error={code}")).into_response()
}

/// Home for a resolved user.
const fn home_for(user: &CurrentUser) -> &'static str {
    if user.is_admin() { "/admin" } else { "/dashboard" }
}

/// Which sign-in form was submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SigninArea {
    Client,
    Admin,
}

impl SigninArea {
    const fn page(self) -> &'static str {
        match self {
            Self::Client => CLIENT_SIGNIN,
            Self::Admin => ADMIN_SIGNIN,
        }
    }
}

/// Resolve the profile for a freshly authenticated identity and start the
/// session. Clients signing in on the admin page are refused before any
/// session is written.
async fn start_session(
    state: &AppState,
    session: &Session,
    identity: &Identity,
    area: SigninArea,
) -> Result<CurrentUser, &'static str> {
    let session_identity = identity.to_session();
    let user = resolve_current_user(Some(&session_identity), &state.profiles())
        .await
        .ok_or("failed")?;

    if area == SigninArea::Admin && !user.is_admin() {
        tracing::warn!(profile_id = %user.id(), "Non-admin sign-in attempt on admin page");
        return Err("not_admin");
    }

    if let Err(e) = set_session_identity(session, &session_identity).await {
        tracing::error!("Failed to set session: {}", e);
        return Err("session");
    }

    set_sentry_user(&user.id(), Some(user.profile.email.as_str()));
    tracing::info!(profile_id = %user.id(), role = %user.role(), "Signed in");
    Ok(user)
}

// =============================================================================
// Sign-in Routes
// =============================================================================

fn signin_page(area: SigninArea, query: &MessageQuery) -> SigninTemplate {
    let heading = match area {
        SigninArea::Client => "Sign in to your dashboard",
        SigninArea::Admin => "Admin sign in",
    };
    SigninTemplate {
        heading: heading.to_owned(),
        action: area.page().to_owned(),
        error: error_message(query.error.as_deref()),
        show_signup: area == SigninArea::Client,
    }
}

/// Display the client sign-in page.
///
/// A signed-in caller with a stored profile is sent to their area home.
/// Anyone else, including sessions the guard turned away, gets the form.
pub async fn client_signin_page(
    State(state): State<AppState>,
    OptionalIdentity(identity): OptionalIdentity,
    Query(query): Query<MessageQuery>,
) -> Response {
    let home = match identity.as_ref() {
        Some(identity) if query.error.is_none() => {
            signed_in_home(identity, &state.profiles()).await
        }
        _ => None,
    };
    if let Some(home) = home {
        return Redirect::to(home).into_response();
    }
    signin_page(SigninArea::Client, &query).into_response()
}

/// Display the admin sign-in page.
pub async fn admin_signin_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    signin_page(SigninArea::Admin, &query)
}

async fn sign_in(
    state: &AppState,
    session: &Session,
    form: &SigninForm,
    area: SigninArea,
) -> Response {
    let identities = state.identities();
    let auth = AuthService::new(&identities);

    let identity = match auth.sign_in(&form.email, &form.password).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::warn!("Sign-in failed: {}", e);
            return back_to(area.page(), error_code(&e));
        }
    };

    match start_session(state, session, &identity, area).await {
        Ok(user) => Redirect::to(home_for(&user)).into_response(),
        Err(code) => back_to(area.page(), code),
    }
}

/// Handle the client sign-in form. Admins land on `/admin`.
pub async fn client_signin(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SigninForm>,
) -> Response {
    sign_in(&state, &session, &form, SigninArea::Client).await
}

/// Handle the admin sign-in form.
pub async fn admin_signin(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SigninForm>,
) -> Response {
    sign_in(&state, &session, &form, SigninArea::Admin).await
}

// =============================================================================
// Sign-up Routes
// =============================================================================

const SIGNUP_PAGE: &str = "/auth/client/signup";

/// Display the sign-up page.
pub async fn signup_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    SignupTemplate {
        error: error_message(query.error.as_deref()),
    }
}

/// Handle the sign-up form. New accounts are always clients.
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Response {
    if form.password != form.password_confirm {
        return back_to(SIGNUP_PAGE, error_code(&AuthError::PasswordMismatch));
    }

    let identities = state.identities();
    let auth = AuthService::new(&identities);
    let identity = match auth.sign_up_client(&form.email, &form.password).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::warn!("Sign-up failed: {}", e);
            return back_to(SIGNUP_PAGE, error_code(&e));
        }
    };

    match start_session(&state, &session, &identity, SigninArea::Client).await {
        Ok(user) => Redirect::to(home_for(&user)).into_response(),
        Err(code) => back_to(CLIENT_SIGNIN, code),
    }
}

// =============================================================================
// Invite Routes
// =============================================================================

/// Display the invite acceptance page.
pub async fn invite_page(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    let invite = match state.invites().get_by_token(&token).await {
        Ok(invite) => invite.filter(|i| i.is_valid(Utc::now())),
        Err(e) => {
            tracing::error!("Failed to load invite: {}", e);
            None
        }
    };

    match invite {
        Some(invite) => InviteTemplate {
            token,
            email: Some(invite.email.to_string()),
            role: invite.role.as_str().to_owned(),
            error: error_message(query.error.as_deref()),
        },
        None => InviteTemplate {
            token,
            email: None,
            role: String::new(),
            error: error_message(Some("invite")),
        },
    }
}

/// Accept an invite: create the identity, consume the invite, sign in.
pub async fn accept_invite(
    State(state): State<AppState>,
    session: Session,
    Path(token): Path<String>,
    Form(form): Form<InviteForm>,
) -> Response {
    let page = format!("/auth/invite/{}", urlencoding::encode(&token));

    if form.password != form.password_confirm {
        return back_to(&page, error_code(&AuthError::PasswordMismatch));
    }

    let invites = state.invites();
    let invite = match invites.get_by_token(&token).await {
        Ok(Some(invite)) => invite,
        Ok(None) => return back_to(&page, "invite"),
        Err(e) => {
            tracing::error!("Failed to load invite: {}", e);
            return back_to(&page, "failed");
        }
    };

    let identities = state.identities();
    let auth = AuthService::new(&identities);
    let identity = match auth.accept_invite(&invite, &form.password, Utc::now()).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::warn!(invite_id = %invite.id, "Invite acceptance failed: {}", e);
            return back_to(&page, error_code(&e));
        }
    };

    if let Err(e) = invites.mark_used(invite.id).await {
        tracing::error!(invite_id = %invite.id, "Failed to mark invite used: {}", e);
    }

    match start_session(&state, &session, &identity, SigninArea::Client).await {
        Ok(user) => Redirect::to(home_for(&user)).into_response(),
        Err(code) => back_to(CLIENT_SIGNIN, code),
    }
}

// =============================================================================
// Sign-out
// =============================================================================

/// Handle sign-out.
pub async fn signout(session: Session) -> Response {
    if let Err(e) = clear_session_identity(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }
    clear_sentry_user();
    Redirect::to(CLIENT_SIGNIN).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_have_messages() {
        let errors = [
            AuthError::InvalidCredentials,
            AuthError::UserAlreadyExists,
            AuthError::WeakPassword("short".to_owned()),
            AuthError::PasswordMismatch,
            AuthError::InvalidInvite,
            AuthError::PasswordHash,
        ];
        for err in &errors {
            assert!(error_message(Some(error_code(err))).is_some(), "{err}");
        }
    }

    #[test]
    fn test_unknown_error_code_is_hidden() {
        assert_eq!(error_message(Some("<script>")), None);
        assert_eq!(error_message(None), None);
    }
}
