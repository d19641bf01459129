//! Uniform JSON envelope for server actions.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::AppError;

/// `{success, data?, error?}` returned by every action endpoint.
#[derive(Debug, Serialize)]
pub struct ActionResult<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    status: StatusCode,
}

impl<T> ActionResult<T> {
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            status: StatusCode::OK,
        }
    }

    /// A failed action with a user-facing message.
    #[must_use]
    pub fn fail(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            status,
        }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl ActionResult<()> {
    /// Success without a payload.
    #[must_use]
    pub const fn done() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            status: StatusCode::OK,
        }
    }
}

impl<T> From<AppError> for ActionResult<T> {
    fn from(err: AppError) -> Self {
        err.report();
        if !err.status().is_server_error() {
            tracing::warn!(error = %err, "Action failed");
        }
        Self::fail(err.status(), err.public_message())
    }
}

impl<T> From<Result<T, AppError>> for ActionResult<T> {
    fn from(result: Result<T, AppError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => err.into(),
        }
    }
}

impl<T: Serialize> IntoResponse for ActionResult<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::RepositoryError;

    #[test]
    fn test_ok_shape() {
        let json = serde_json::to_value(ActionResult::ok(vec![1, 2])).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": [1, 2]}));
    }

    #[test]
    fn test_done_shape() {
        let json = serde_json::to_value(ActionResult::done()).unwrap();
        assert_eq!(json, serde_json::json!({"success": true}));
    }

    #[test]
    fn test_error_converted_at_boundary() {
        let result: ActionResult<()> =
            Err::<(), _>(AppError::Database(RepositoryError::NotFound)).into();
        assert_eq!(result.status(), StatusCode::NOT_FOUND);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "error": "Not found"}));
    }

    #[test]
    fn test_internal_details_hidden() {
        let result: ActionResult<()> = AppError::Internal("pool exhausted".to_string()).into();
        assert_eq!(result.error.as_deref(), Some("Internal server error"));
    }
}
