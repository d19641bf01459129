//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID
//! 4. Security headers
//! 5. Session layer (tower-sessions with `PostgreSQL` store)
//! 6. Route guard (`/dashboard`, `/admin`)
//! 7. Rate limiting on the auth form routes

pub mod auth;
pub mod guard;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    OptionalIdentity, RequireAdmin, RequireUser, clear_session_identity, set_session_identity,
};
pub use guard::{GuardDecision, authorize, route_guard, signed_in_home};
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
