//! Password change for the signed-in caller.

use axum::{Json, extract::State};
use serde::Deserialize;

use crate::error::AppError;
use crate::middleware::{RequireAdmin, RequireUser};
use crate::models::CurrentUser;
use crate::response::ActionResult;
use crate::services::AuthService;
use crate::state::AppState;

/// Password change payload.
#[derive(Debug, Deserialize)]
pub struct PasswordChange {
    pub password: String,
    pub confirm: String,
}

async fn change_password(
    state: &AppState,
    user: &CurrentUser,
    form: &PasswordChange,
) -> ActionResult<()> {
    let identities = state.identities();
    let auth = AuthService::new(&identities);

    match auth
        .change_password(&user.identity, &form.password, &form.confirm)
        .await
    {
        Ok(()) => {
            tracing::info!(profile_id = %user.id(), "Password changed");
            ActionResult::done()
        }
        Err(e) => AppError::from(e).into(),
    }
}

/// Change password from the client dashboard.
pub async fn client_password(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Json(form): Json<PasswordChange>,
) -> ActionResult<()> {
    change_password(&state, &user, &form).await
}

/// Change password from the admin console.
pub async fn admin_password(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Json(form): Json<PasswordChange>,
) -> ActionResult<()> {
    change_password(&state, &user, &form).await
}
