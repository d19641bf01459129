//! Content actions for the client dashboard.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Serialize;

use storecast_core::{ContentId, ContentStatus};

use super::dashboard::{DashboardQuery, dashboard_owner, writable_owner};
use super::{StepOutcome, parse_id};
use crate::catalog;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::{ContentItem, ContentListing, CurrentUser};
use crate::response::ActionResult;
use crate::services::{ContentService, UploadForm};
use crate::state::AppState;

/// A listing with its status at request time.
#[derive(Debug, Serialize)]
pub struct ContentEntry {
    #[serde(flatten)]
    pub listing: ContentListing,
    pub status: ContentStatus,
}

/// List the dashboard owner's content, filtered and sorted by the query.
pub async fn list(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> ActionResult<Vec<ContentEntry>> {
    list_content(&state, &user, &query).await.into()
}

async fn list_content(
    state: &AppState,
    user: &CurrentUser,
    query: &DashboardQuery,
) -> Result<Vec<ContentEntry>> {
    let owner = dashboard_owner(state, user, query.admin_view.as_deref()).await?;
    let items = state.content().list_for_owner(owner.id).await?;

    let now = Utc::now();
    let items = catalog::prepare(
        items,
        &query.catalog.filter(),
        query.catalog.sort_spec(),
        now,
    );
    Ok(items
        .into_iter()
        .map(|listing| ContentEntry {
            status: listing.item.status(now),
            listing,
        })
        .collect())
}

fn bad_multipart(e: &axum::extract::multipart::MultipartError) -> AppError {
    AppError::BadRequest(e.body_text())
}

/// Collect the multipart fields into an [`UploadForm`].
///
/// Repeated `recurrence_days` fields (checkboxes) are joined with commas.
async fn read_upload(mut multipart: Multipart) -> Result<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| bad_multipart(&e))? {
        let name = field.name().unwrap_or_default().to_owned();
        if name == "file" {
            form.file_name = field.file_name().map(str::to_owned);
            form.mime = field.content_type().map(str::to_owned);
            form.bytes = field
                .bytes()
                .await
                .map_err(|e| bad_multipart(&e))?
                .to_vec();
            continue;
        }

        let value = field.text().await.map_err(|e| bad_multipart(&e))?;
        let slot = match name.as_str() {
            "title" => &mut form.title,
            "type" | "content_type" => &mut form.content_type,
            "store_id" => &mut form.store_id,
            "start_date" => &mut form.start_date,
            "end_date" => &mut form.end_date,
            "recurrence_type" => &mut form.recurrence_type,
            "recurrence_days" => &mut form.recurrence_days,
            _ => continue,
        };
        if name == "recurrence_days" {
            if let Some(existing) = slot.as_mut() {
                existing.push(',');
                existing.push_str(&value);
                continue;
            }
        }
        *slot = Some(value);
    }

    Ok(form)
}

/// Upload a file and create its content record.
pub async fn upload(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> ActionResult<ContentItem> {
    upload_content(&state, &user, multipart).await.into()
}

async fn upload_content(
    state: &AppState,
    user: &CurrentUser,
    multipart: Multipart,
) -> Result<ContentItem> {
    let owner = writable_owner(user)?;
    let form = read_upload(multipart).await?;
    let request = form.validate(state.config().max_upload_bytes)?;

    let records = state.content();
    let service = ContentService::new(&records, state.media());
    Ok(service.upload(owner, request).await?)
}

/// Delete a content item and its stored file.
///
/// The record deletion decides success; a failed file deletion is reported
/// as a warning.
pub async fn delete(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ActionResult<StepOutcome> {
    delete_content(&state, &user, &id)
        .await
        .unwrap_or_else(Into::into)
}

async fn delete_content(
    state: &AppState,
    user: &CurrentUser,
    id: &str,
) -> Result<ActionResult<StepOutcome>> {
    let owner = writable_owner(user)?;
    let id: ContentId = parse_id(id, "content")?;

    let records = state.content();
    let service = ContentService::new(&records, state.media());
    let log = service.delete(owner, id).await?;

    Ok(StepOutcome::respond(
        &log,
        StatusCode::INTERNAL_SERVER_ERROR,
        "Content could not be deleted",
    ))
}
