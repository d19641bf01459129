//! Storecast web application library.
//!
//! Client dashboard (`/dashboard`) and admin console (`/admin`) for
//! scheduling media content across retail stores. Exposed as a library so
//! the router can be exercised from integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;

#[cfg(test)]
mod testing;

use axum::{Router, middleware::from_fn, middleware::from_fn_with_state};
use tower_http::services::ServeDir;
use tower_sessions::{SessionManagerLayer, SessionStore};

use middleware::{request_id_middleware, route_guard, security_headers_middleware};
use state::AppState;

/// Directory the static assets are served from.
pub const STATIC_DIR: &str = "crates/app/static";

/// Build the application router with its middleware stack.
///
/// Tracing and Sentry layers are added by the binary.
pub fn app<S>(state: AppState, session_layer: SessionManagerLayer<S>) -> Router
where
    S: SessionStore + Clone,
{
    Router::new()
        .merge(routes::routes(state.config().max_upload_bytes))
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(from_fn_with_state(state.clone(), route_guard))
        .layer(session_layer)
        .layer(from_fn_with_state(state.clone(), security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
