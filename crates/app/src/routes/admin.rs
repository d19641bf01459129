//! Admin console route handlers.
//!
//! Everything here sits behind the admin area guard and reads across all
//! clients.

use askama::Template;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use storecast_core::{Email, ProfileId, Role};

use super::views::{
    ContentCardView, FilterView, GroupView, PagerView, StatsView, StoreView, UserView,
};
use super::{StepOutcome, catalog_page_number, csv_response, error_page, parse_id, render};
use crate::catalog::{self, CatalogQuery, group, paginate};
use crate::db::IdentityRecords;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::middleware::guard::ADMIN_VIEW_PARAM;
use crate::models::{CurrentUser, Invite, Profile};
use crate::response::ActionResult;
use crate::services::export::{bulk_export_filename, client_export_filename, to_csv};
use crate::services::invites::{acceptance_url, generate_token};
use crate::services::AccountService;
use crate::state::AppState;

/// Recent uploads shown on the overview.
const RECENT_UPLOADS: usize = 5;

// =============================================================================
// View types
// =============================================================================

/// Client row in the clients table.
#[derive(Debug, Clone)]
pub struct ClientRowView {
    pub id: String,
    pub email: String,
    pub store_count: i64,
    pub content_count: i64,
    pub joined: String,
    pub dashboard_url: String,
}

/// Pending invite row.
#[derive(Debug, Clone)]
pub struct InviteView {
    pub email: String,
    pub role: String,
    pub expires: String,
}

impl From<&Invite> for InviteView {
    fn from(invite: &Invite) -> Self {
        Self {
            email: invite.email.to_string(),
            role: invite.role.as_str().to_owned(),
            expires: invite.expires_at.format("%b %-d, %Y %H:%M UTC").to_string(),
        }
    }
}

fn dashboard_url(id: ProfileId) -> String {
    format!("/dashboard?{ADMIN_VIEW_PARAM}={id}")
}

// =============================================================================
// Templates
// =============================================================================

/// Admin overview template.
#[derive(Template)]
#[template(path = "admin/index.html")]
pub struct OverviewTemplate {
    pub user: UserView,
    pub current_path: String,
    pub client_count: i64,
    pub store_count: i64,
    pub stats: StatsView,
    /// Most recent uploads.
    pub cards: Vec<ContentCardView>,
    pub grid: bool,
    pub deletable: bool,
    pub invites: Vec<InviteView>,
}

/// Content browser template.
#[derive(Template)]
#[template(path = "admin/content.html")]
pub struct ContentBrowserTemplate {
    pub user: UserView,
    pub current_path: String,
    pub stats: StatsView,
    pub filter: FilterView,
    pub export_url: String,
    pub total: usize,
    /// Set when grouping; the flat list is empty then.
    pub groups: Vec<GroupView>,
    pub grouped: bool,
    pub cards: Vec<ContentCardView>,
    pub grid: bool,
    pub deletable: bool,
    pub pager: Option<PagerView>,
}

/// Clients list template.
#[derive(Template)]
#[template(path = "admin/clients.html")]
pub struct ClientsTemplate {
    pub user: UserView,
    pub current_path: String,
    pub clients: Vec<ClientRowView>,
    pub invites: Vec<InviteView>,
}

/// Client detail template.
#[derive(Template)]
#[template(path = "admin/client_detail.html")]
pub struct ClientDetailTemplate {
    pub user: UserView,
    pub current_path: String,
    pub client_id: String,
    pub client_email: String,
    pub client_role: String,
    pub joined: String,
    pub dashboard_url: String,
    pub stores: Vec<StoreView>,
    pub stats: StatsView,
    pub cards: Vec<ContentCardView>,
    pub grid: bool,
    pub deletable: bool,
}

// =============================================================================
// Pages
// =============================================================================

/// Admin overview.
#[instrument(skip(admin, state))]
pub async fn index(RequireAdmin(admin): RequireAdmin, State(state): State<AppState>) -> Response {
    match overview(&state, &admin).await {
        Ok(page) => page.into_response(),
        Err(e) => error_page(&e),
    }
}

async fn overview(state: &AppState, admin: &CurrentUser) -> Result<Html<String>> {
    let profiles = state.profiles();
    let stores = state.stores();
    let content = state.content();
    let invites = state.invites();

    let (client_count, store_count, mut listings, pending) = tokio::try_join!(
        profiles.count_by_role(Role::Client),
        stores.count_all(),
        content.list_all(),
        invites.list_pending(),
    )?;

    let now = Utc::now();
    let stats = StatsView::count(&listings, now);
    listings.truncate(RECENT_UPLOADS);

    Ok(render(&OverviewTemplate {
        user: UserView::from(admin),
        current_path: "/admin".to_owned(),
        client_count,
        store_count,
        stats,
        cards: listings
            .iter()
            .map(|listing| ContentCardView::new(listing, now))
            .collect(),
        grid: false,
        deletable: false,
        invites: pending.iter().map(InviteView::from).collect(),
    }))
}

/// Content browser across all clients.
///
/// With `group` set, every filtered item is shown grouped by location or
/// company; otherwise the flat list is paginated.
#[instrument(skip(admin, state, session, query))]
pub async fn content(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CatalogQuery>,
) -> Response {
    match content_browser(&state, &session, &admin, &query).await {
        Ok(page) => page.into_response(),
        Err(e) => error_page(&e),
    }
}

async fn content_browser(
    state: &AppState,
    session: &Session,
    admin: &CurrentUser,
    query: &CatalogQuery,
) -> Result<Html<String>> {
    let listings = state.content().list_all().await?;

    let now = Utc::now();
    let stats = StatsView::count(&listings, now);
    let items = catalog::prepare(listings, &query.filter(), query.sort_spec(), now);
    let filter = FilterView::new(query, Vec::new()).with_grouping();
    let export_url = format!("/admin/content/export{}", filter.query_with(&[]));

    let total = items.len();
    let (groups, cards, pager) = match query.group_mode() {
        Some(mode) => {
            let groups: Vec<GroupView> = group(items, mode)
                .into_iter()
                .map(|g| {
                    GroupView::from(g.map_items(&|listing| ContentCardView::new(&listing, now)))
                })
                .collect();
            (groups, Vec::new(), None)
        }
        None => {
            let number = catalog_page_number(session, "admin:content", query).await;
            let page = paginate(items, number, query.view_mode().page_size());
            let pager = PagerView::new(&page, &filter);
            let cards: Vec<ContentCardView> = page
                .items
                .iter()
                .map(|listing| ContentCardView::new(listing, now))
                .collect();
            (Vec::new(), cards, Some(pager))
        }
    };

    Ok(render(&ContentBrowserTemplate {
        user: UserView::from(admin),
        current_path: "/admin/content".to_owned(),
        stats,
        grouped: pager.is_none(),
        total,
        groups,
        grid: filter.is_grid,
        deletable: false,
        filter,
        export_url,
        cards,
        pager,
    }))
}

/// CSV of all content matching the browser's filters and sort.
#[instrument(skip(_admin, state, query))]
pub async fn export_content(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Response {
    let listings = match state.content().list_all().await {
        Ok(listings) => listings,
        Err(e) => return AppError::from(e).into_response(),
    };

    let now = Utc::now();
    let items = catalog::prepare(listings, &query.filter(), query.sort_spec(), now);
    tracing::info!(rows = items.len(), "Exporting content");
    csv_response(&bulk_export_filename(now.date_naive()), to_csv(&items))
}

/// Clients list with pending invites.
#[instrument(skip(admin, state))]
pub async fn clients(RequireAdmin(admin): RequireAdmin, State(state): State<AppState>) -> Response {
    match client_list(&state, &admin).await {
        Ok(page) => page.into_response(),
        Err(e) => error_page(&e),
    }
}

async fn client_list(state: &AppState, admin: &CurrentUser) -> Result<Html<String>> {
    let profiles = state.profiles();
    let invites = state.invites();
    let (summaries, pending) = tokio::try_join!(profiles.list_clients(), invites.list_pending())?;

    let clients = summaries
        .into_iter()
        .map(|summary| ClientRowView {
            id: summary.profile.id.to_string(),
            email: summary.profile.email.to_string(),
            store_count: summary.store_count,
            content_count: summary.content_count,
            joined: summary.profile.created_at.format("%b %-d, %Y").to_string(),
            dashboard_url: dashboard_url(summary.profile.id),
        })
        .collect();

    Ok(render(&ClientsTemplate {
        user: UserView::from(admin),
        current_path: "/admin/clients".to_owned(),
        clients,
        invites: pending.iter().map(InviteView::from).collect(),
    }))
}

async fn find_client(state: &AppState, raw_id: &str) -> Result<Profile> {
    let id: ProfileId = parse_id(raw_id, "client")?;
    state
        .profiles()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Client not found".to_owned()))
}

/// One client's stores and content.
#[instrument(skip(admin, state))]
pub async fn client_detail(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match client_page(&state, &admin, &id).await {
        Ok(page) => page.into_response(),
        Err(e) => error_page(&e),
    }
}

async fn client_page(state: &AppState, admin: &CurrentUser, id: &str) -> Result<Html<String>> {
    let client = find_client(state, id).await?;

    let stores_repo = state.stores();
    let content_repo = state.content();
    let (stores, listings) = tokio::try_join!(
        stores_repo.list_for_owner(client.id),
        content_repo.list_for_owner(client.id),
    )
    .map_err(|e| {
        tracing::error!(client_id = %client.id, "Failed to load client: {}", e);
        AppError::NotFound("Client not available".to_owned())
    })?;

    let now = Utc::now();
    Ok(render(&ClientDetailTemplate {
        user: UserView::from(admin),
        current_path: "/admin/clients".to_owned(),
        client_id: client.id.to_string(),
        client_email: client.email.to_string(),
        client_role: client.role.as_str().to_owned(),
        joined: client.created_at.format("%b %-d, %Y").to_string(),
        dashboard_url: dashboard_url(client.id),
        stores: stores.iter().map(StoreView::from).collect(),
        stats: StatsView::count(&listings, now),
        cards: listings
            .iter()
            .map(|listing| ContentCardView::new(listing, now))
            .collect(),
        grid: false,
        deletable: false,
    }))
}

/// CSV of one client's content.
#[instrument(skip(_admin, state))]
pub async fn export_client(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let client = match find_client(&state, &id).await {
        Ok(client) => client,
        Err(e) => return e.into_response(),
    };

    match state.content().list_for_owner(client.id).await {
        Ok(listings) => {
            let filename = client_export_filename(client.email.as_str(), Utc::now().date_naive());
            csv_response(&filename, to_csv(&listings))
        }
        Err(e) => AppError::from(e).into_response(),
    }
}

// =============================================================================
// Actions
// =============================================================================

/// Role change payload.
#[derive(Debug, Deserialize)]
pub struct RoleChange {
    pub role: String,
}

/// Switch a profile between client and admin.
pub async fn set_role(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<RoleChange>,
) -> ActionResult<StepOutcome> {
    change_role(&state, &admin, &id, &body)
        .await
        .unwrap_or_else(Into::into)
}

async fn change_role(
    state: &AppState,
    admin: &CurrentUser,
    id: &str,
    body: &RoleChange,
) -> Result<ActionResult<StepOutcome>> {
    let id: ProfileId = parse_id(id, "client")?;
    let role: Role = body.role.trim().parse().map_err(AppError::BadRequest)?;
    if id == admin.id() && role != Role::Admin {
        return Err(AppError::BadRequest(
            "You cannot remove your own admin role".to_owned(),
        ));
    }

    let identities = state.identities();
    let profiles = state.profiles();
    let log = AccountService::new(&identities, &profiles)
        .set_role(id, role)
        .await?;

    tracing::info!(profile_id = %id, role = %role, changed_by = %admin.id(), "Role changed");
    Ok(StepOutcome::respond(
        &log,
        StatusCode::INTERNAL_SERVER_ERROR,
        "Role could not be changed",
    ))
}

/// Email change payload.
#[derive(Debug, Deserialize)]
pub struct EmailChange {
    pub email: String,
}

/// Change a profile's sign-in email.
pub async fn set_email(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<EmailChange>,
) -> ActionResult<StepOutcome> {
    change_email(&state, &admin, &id, &body.email)
        .await
        .unwrap_or_else(Into::into)
}

async fn change_email(
    state: &AppState,
    admin: &CurrentUser,
    id: &str,
    email: &str,
) -> Result<ActionResult<StepOutcome>> {
    let id: ProfileId = parse_id(id, "client")?;

    let identities = state.identities();
    let profiles = state.profiles();
    let log = AccountService::new(&identities, &profiles)
        .change_email(id, email)
        .await?;

    tracing::info!(profile_id = %id, changed_by = %admin.id(), "Email changed");
    Ok(StepOutcome::respond(
        &log,
        StatusCode::CONFLICT,
        "Email could not be changed (it may already be in use)",
    ))
}

/// Invite payload.
#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// A created invite, with the link to hand to the invitee.
#[derive(Debug, Serialize)]
pub struct InviteCreated {
    pub email: Email,
    pub role: Role,
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

/// Create an invite link.
pub async fn create_invite(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<InviteRequest>,
) -> ActionResult<InviteCreated> {
    invite(&state, &admin, &body).await.into()
}

async fn invite(
    state: &AppState,
    admin: &CurrentUser,
    body: &InviteRequest,
) -> Result<InviteCreated> {
    let email = Email::parse(&body.email).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let role = match body.role.as_deref().map(str::trim) {
        None | Some("") => Role::Client,
        Some(raw) => raw.parse().map_err(AppError::BadRequest)?,
    };

    if state.identities().find_by_email(&email).await?.is_some() {
        return Err(AppError::BadRequest(
            "An account with this email already exists".to_owned(),
        ));
    }

    let token = generate_token();
    let invite = state
        .invites()
        .create(
            &email,
            role,
            &token,
            Some(admin.id()),
            state.config().invite_ttl_hours,
        )
        .await?;

    tracing::info!(
        invite_id = %invite.id,
        role = %role,
        invited_by = %admin.id(),
        "Invite created"
    );
    Ok(InviteCreated {
        url: acceptance_url(&state.config().base_url, &invite.token),
        email: invite.email,
        role: invite.role,
        expires_at: invite.expires_at,
    })
}

/// Pending invites as JSON.
pub async fn list_invites(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> ActionResult<Vec<Invite>> {
    state
        .invites()
        .list_pending()
        .await
        .map_err(AppError::from)
        .into()
}
