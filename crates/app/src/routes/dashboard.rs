//! Client dashboard page.
//!
//! Clients see their own stores and content. An admin reaches the same page
//! with `?admin_view=<client id>` and sees that client's dashboard read-only.

use askama::Template;
use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use storecast_core::ProfileId;

use super::views::{ContentCardView, FilterView, PagerView, StatsView, StoreView, UserView};
use super::{catalog_page_number, error_page, render};
use crate::catalog::{self, CatalogQuery, paginate};
use crate::error::AppError;
use crate::middleware::RequireUser;
use crate::middleware::guard::ADMIN_VIEW_PARAM;
use crate::models::{CurrentUser, Profile};
use crate::state::AppState;

/// Dashboard query: catalog controls plus the admin view target.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    #[serde(flatten)]
    pub catalog: CatalogQuery,
    pub admin_view: Option<String>,
}

/// Dashboard template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub user: UserView,
    pub current_path: String,
    /// Email of the client being viewed by an admin.
    pub viewing: Option<String>,
    pub read_only: bool,
    pub stores: Vec<StoreView>,
    pub stats: StatsView,
    pub filter: FilterView,
    pub cards: Vec<ContentCardView>,
    pub grid: bool,
    pub deletable: bool,
    pub pager: PagerView,
    pub max_upload_mb: usize,
}

/// Whose dashboard the caller is looking at.
///
/// Clients always get their own. Admins get the client named by
/// `admin_view`; an unknown id or a non-client profile is not found.
///
/// # Errors
///
/// Returns `AppError::NotFound` for a bad `admin_view` target.
pub async fn dashboard_owner(
    state: &AppState,
    user: &CurrentUser,
    admin_view: Option<&str>,
) -> Result<Profile, AppError> {
    if !user.is_admin() {
        return Ok(user.profile.clone());
    }

    let target = admin_view
        .and_then(|raw| raw.parse::<ProfileId>().ok())
        .ok_or_else(|| AppError::NotFound("Client not found".to_owned()))?;

    state
        .profiles()
        .get_by_id(target)
        .await?
        .filter(|profile| !profile.role.is_admin())
        .ok_or_else(|| AppError::NotFound("Client not found".to_owned()))
}

/// Reject writes from an admin viewing a client's dashboard.
///
/// # Errors
///
/// Returns `AppError::Forbidden` for admins.
pub fn writable_owner(user: &CurrentUser) -> Result<ProfileId, AppError> {
    if user.is_admin() {
        return Err(AppError::Forbidden(
            "Client dashboards are read-only in admin view".to_owned(),
        ));
    }
    Ok(user.id())
}

/// Display the dashboard.
#[instrument(skip(user, state, session, query), fields(profile_id = %user.id()))]
pub async fn index(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<DashboardQuery>,
) -> Response {
    match render_dashboard(&state, &session, &user, &query).await {
        Ok(page) => page.into_response(),
        Err(e) => error_page(&e),
    }
}

async fn render_dashboard(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
    query: &DashboardQuery,
) -> Result<Html<String>, AppError> {
    let owner = dashboard_owner(state, user, query.admin_view.as_deref()).await?;

    let stores_repo = state.stores();
    let content_repo = state.content();
    let (stores, content) = tokio::try_join!(
        stores_repo.list_for_owner(owner.id),
        content_repo.list_for_owner(owner.id),
    )
    .map_err(|e| {
        tracing::error!(owner_id = %owner.id, "Failed to load dashboard: {}", e);
        AppError::NotFound("Dashboard not available".to_owned())
    })?;

    let now = Utc::now();
    let catalog_query = &query.catalog;
    let stats = StatsView::count(&content, now);
    let items = catalog::prepare(
        content,
        &catalog_query.filter(),
        catalog_query.sort_spec(),
        now,
    );

    let view_key = format!("dashboard:{}", owner.id);
    let number = catalog_page_number(session, &view_key, catalog_query).await;
    let page = paginate(items, number, catalog_query.view_mode().page_size());

    let carry = if user.is_admin() {
        vec![(ADMIN_VIEW_PARAM.to_owned(), owner.id.to_string())]
    } else {
        Vec::new()
    };
    let filter = FilterView::new(catalog_query, carry);
    let pager = PagerView::new(&page, &filter);
    let cards = page
        .items
        .iter()
        .map(|listing| ContentCardView::new(listing, now))
        .collect();

    let template = DashboardTemplate {
        user: UserView::from(user),
        current_path: "/dashboard".to_owned(),
        viewing: user.is_admin().then(|| owner.email.to_string()),
        read_only: user.is_admin(),
        stores: stores.iter().map(StoreView::from).collect(),
        stats,
        grid: filter.is_grid,
        deletable: !user.is_admin(),
        filter,
        cards,
        pager,
        max_upload_mb: state.config().max_upload_bytes / (1024 * 1024),
    };

    Ok(render(&template))
}
