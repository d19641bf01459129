//! Store actions for the client dashboard.

use axum::{
    Json,
    extract::{Path, Query, State},
};

use storecast_core::StoreId;

use super::dashboard::{DashboardQuery, dashboard_owner, writable_owner};
use super::parse_id;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::{CurrentUser, Store, StoreInput};
use crate::response::ActionResult;
use crate::state::AppState;

/// List the dashboard owner's stores.
pub async fn list(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> ActionResult<Vec<Store>> {
    list_stores(&state, &user, query.admin_view.as_deref())
        .await
        .into()
}

async fn list_stores(
    state: &AppState,
    user: &CurrentUser,
    admin_view: Option<&str>,
) -> Result<Vec<Store>> {
    let owner = dashboard_owner(state, user, admin_view).await?;
    Ok(state.stores().list_for_owner(owner.id).await?)
}

/// Create a store.
pub async fn create(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Json(input): Json<StoreInput>,
) -> ActionResult<Store> {
    create_store(&state, &user, input).await.into()
}

async fn create_store(state: &AppState, user: &CurrentUser, input: StoreInput) -> Result<Store> {
    let owner = writable_owner(user)?;
    let input = input.validate().map_err(AppError::BadRequest)?;
    let store = state.stores().create(owner, &input).await?;
    tracing::info!(store_id = %store.id, owner_id = %owner, "Store created");
    Ok(store)
}

/// Update one of the caller's stores.
pub async fn update(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<StoreInput>,
) -> ActionResult<Store> {
    update_store(&state, &user, &id, input).await.into()
}

async fn update_store(
    state: &AppState,
    user: &CurrentUser,
    id: &str,
    input: StoreInput,
) -> Result<Store> {
    let owner = writable_owner(user)?;
    let id: StoreId = parse_id(id, "store")?;
    let input = input.validate().map_err(AppError::BadRequest)?;
    Ok(state.stores().update(id, owner, &input).await?)
}

/// Delete one of the caller's stores. Stores with content are kept.
pub async fn delete(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ActionResult<()> {
    match delete_store(&state, &user, &id).await {
        Ok(()) => ActionResult::done(),
        Err(e) => e.into(),
    }
}

async fn delete_store(state: &AppState, user: &CurrentUser, id: &str) -> Result<()> {
    let owner = writable_owner(user)?;
    let id: StoreId = parse_id(id, "store")?;
    state.stores().delete(id, owner).await?;
    tracing::info!(store_id = %id, owner_id = %owner, "Store deleted");
    Ok(())
}
