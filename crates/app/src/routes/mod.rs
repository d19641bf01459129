//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                              - Redirect to the caller's home
//! GET  /health                        - Liveness
//! GET  /health/ready                  - Readiness (database ping)
//!
//! # Auth
//! GET  /auth/client/signin            - Client sign-in page
//! POST /auth/client/signin            - Client sign-in (rate limited)
//! GET  /auth/client/signup            - Sign-up page
//! POST /auth/client/signup            - Sign-up (rate limited)
//! GET  /auth/admin/signin             - Admin sign-in page
//! POST /auth/admin/signin             - Admin sign-in (rate limited)
//! GET  /auth/invite/{token}           - Invite acceptance page
//! POST /auth/invite/{token}           - Accept invite (rate limited)
//! POST /auth/signout                  - Sign out
//!
//! # Client dashboard (client, or admin with ?admin_view=<id>)
//! GET  /dashboard                     - Dashboard page
//! GET  /dashboard/api/stores          - List stores
//! POST /dashboard/api/stores          - Create store
//! PUT  /dashboard/api/stores/{id}     - Update store
//! DELETE /dashboard/api/stores/{id}   - Delete store
//! GET  /dashboard/api/content         - List content with status
//! POST /dashboard/api/content         - Upload (multipart)
//! DELETE /dashboard/api/content/{id}  - Delete content
//! POST /dashboard/api/password        - Change password
//!
//! # Admin console
//! GET  /admin                         - Overview
//! GET  /admin/content                 - Content browser
//! GET  /admin/content/export          - CSV of the browser's result set
//! GET  /admin/clients                 - Clients list
//! GET  /admin/clients/{id}            - Client detail
//! GET  /admin/clients/{id}/export     - CSV of one client's content
//! POST /admin/api/clients/{id}/role   - Switch role
//! POST /admin/api/clients/{id}/email  - Change email
//! GET  /admin/api/invites             - Pending invites
//! POST /admin/api/invites             - Create invite link
//! POST /admin/api/password            - Change password
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod content;
pub mod dashboard;
pub mod stores;
pub mod views;

use std::str::FromStr;

use askama::Template;
use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post, put},
};
use serde::Serialize;
use tower_sessions::Session;

use crate::catalog::{CatalogQuery, effective_page};
use crate::error::AppError;
use crate::middleware::guard::CLIENT_SIGNIN;
use crate::middleware::{OptionalIdentity, auth_rate_limiter};
use crate::models::session_keys;
use crate::response::ActionResult;
use crate::services::{StepLog, resolve_current_user};
use crate::state::AppState;

/// Room for the multipart envelope on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Render a template, logging failures.
pub(crate) fn render<T: Template>(template: &T) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}

/// Error page template.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub status: u16,
    pub title: String,
    pub message: String,
}

/// Render an error as a page with the error's status.
pub(crate) fn error_page(err: &AppError) -> Response {
    err.report();
    let status = err.status();
    let template = ErrorTemplate {
        status: status.as_u16(),
        title: status.canonical_reason().unwrap_or("Error").to_owned(),
        message: err.public_message(),
    };
    (status, render(&template)).into_response()
}

/// Parse a path id, naming the entity in the error.
pub(crate) fn parse_id<T: FromStr>(raw: &str, what: &str) -> Result<T, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid {what} id")))
}

/// Page to show for a catalog view, remembering the filter fingerprint in
/// the session so a changed filter starts again at page 1.
pub(crate) async fn catalog_page_number(
    session: &Session,
    view_key: &str,
    query: &CatalogQuery,
) -> usize {
    let key = format!("{}{view_key}", session_keys::FILTER_PREFIX);
    let fingerprint = query.filter().fingerprint();

    let previous: Option<String> = session.get(&key).await.unwrap_or_else(|e| {
        tracing::warn!("Failed to read filter state: {}", e);
        None
    });
    let number = effective_page(query.requested_page(), previous.as_deref(), &fingerprint);

    if previous.as_deref() != Some(fingerprint.as_str()) {
        if let Err(e) = session.insert(&key, &fingerprint).await {
            tracing::warn!("Failed to store filter state: {}", e);
        }
    }
    number
}

/// A CSV download.
pub(crate) fn csv_response(filename: &str, csv: String) -> Response {
    (
        StatusCode::OK,
        [
            ("Content-Type", "text/csv; charset=utf-8"),
            (
                "Content-Disposition",
                &format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv,
    )
        .into_response()
}

/// Result of a multi-step action.
#[derive(Debug, Serialize)]
pub struct StepOutcome {
    /// Best-effort steps that failed.
    pub warnings: Vec<&'static str>,
}

impl StepOutcome {
    /// Success if every primary step succeeded, with failed best-effort
    /// steps listed as warnings.
    pub(crate) fn respond(log: &StepLog, status: StatusCode, message: &str) -> ActionResult<Self> {
        if log.succeeded() {
            return ActionResult::ok(Self {
                warnings: log.warnings(),
            });
        }
        tracing::error!(
            steps = log.steps().len(),
            error = log.primary_error().unwrap_or("no primary step ran"),
            "Multi-step action failed"
        );
        ActionResult::fail(status, message)
    }
}

// =============================================================================
// Root and health
// =============================================================================

/// Send the caller to their home, or to sign-in.
pub async fn home(
    State(state): State<AppState>,
    OptionalIdentity(identity): OptionalIdentity,
) -> Redirect {
    match resolve_current_user(identity.as_ref(), &state.profiles()).await {
        Some(user) if user.is_admin() => Redirect::to("/admin"),
        Some(_) => Redirect::to("/dashboard"),
        None => Redirect::to(CLIENT_SIGNIN),
    }
}

/// Liveness check.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness check.
///
/// Returns 503 Service Unavailable if the database is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::error!("Readiness check failed: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

// =============================================================================
// Routers
// =============================================================================

/// Create the auth routes router. Form submissions are rate limited.
pub fn auth_routes() -> Router<AppState> {
    let pages = Router::new()
        .route("/client/signin", get(auth::client_signin_page))
        .route("/client/signup", get(auth::signup_page))
        .route("/admin/signin", get(auth::admin_signin_page))
        .route("/invite/{token}", get(auth::invite_page))
        .route("/signout", post(auth::signout));

    let forms = Router::new()
        .route("/client/signin", post(auth::client_signin))
        .route("/client/signup", post(auth::signup))
        .route("/admin/signin", post(auth::admin_signin))
        .route("/invite/{token}", post(auth::accept_invite))
        .layer(auth_rate_limiter());

    pages.merge(forms)
}

/// Create the client dashboard router.
pub fn dashboard_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .route("/api/stores", get(stores::list).post(stores::create))
        .route(
            "/api/stores/{id}",
            put(stores::update).delete(stores::delete),
        )
        .route(
            "/api/content",
            get(content::list).post(content::upload).layer(DefaultBodyLimit::max(
                max_upload_bytes.saturating_add(MULTIPART_OVERHEAD),
            )),
        )
        .route("/api/content/{id}", axum::routing::delete(content::delete))
        .route("/api/password", post(account::client_password))
}

/// Create the admin console router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::index))
        .route("/content", get(admin::content))
        .route("/content/export", get(admin::export_content))
        .route("/clients", get(admin::clients))
        .route("/clients/{id}", get(admin::client_detail))
        .route("/clients/{id}/export", get(admin::export_client))
        .route("/api/clients/{id}/role", post(admin::set_role))
        .route("/api/clients/{id}/email", post(admin::set_email))
        .route(
            "/api/invites",
            get(admin::list_invites).post(admin::create_invite),
        )
        .route("/api/password", post(account::admin_password))
}

/// Create all routes for the application.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/auth", auth_routes())
        .nest("/dashboard", dashboard_routes(max_upload_bytes))
        .nest("/admin", admin_routes())
}
