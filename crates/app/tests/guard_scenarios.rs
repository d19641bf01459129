//! Route guard scenarios, decided by `authorize` over an in-memory profile
//! store and driven end to end through the router.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::Utc;
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use tower_sessions::{MemoryStore, Session};

use storecast_app::config::{AppConfig, StorageConfig};
use storecast_app::db::{Access, ProfileStore, RepositoryError};
use storecast_app::middleware::guard::{ADMIN_SIGNIN, CLIENT_SIGNIN};
use storecast_app::middleware::session::{SESSION_COOKIE_NAME, session_layer};
use storecast_app::middleware::{GuardDecision, authorize};
use storecast_app::models::{NewProfile, Profile, SessionIdentity, session_keys};
use storecast_app::state::AppState;
use storecast_core::{Email, ProfileId, Role};

// =============================================================================
// Fixtures
// =============================================================================

/// Profiles keyed by id. `broken` makes every lookup fail.
#[derive(Default)]
struct Profiles {
    rows: HashMap<ProfileId, Profile>,
    broken: bool,
}

impl Profiles {
    fn with(mut self, identity: &SessionIdentity, role: Role) -> Self {
        self.rows.insert(
            identity.id,
            Profile {
                id: identity.id,
                email: identity.email.clone(),
                role,
                created_at: Utc::now(),
            },
        );
        self
    }
}

#[async_trait]
impl ProfileStore for Profiles {
    async fn find(
        &self,
        id: ProfileId,
        access: Access,
    ) -> Result<Option<Profile>, RepositoryError> {
        if self.broken {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        if !access.reaches(id) {
            return Err(RepositoryError::AccessDenied);
        }
        Ok(self.rows.get(&id).cloned())
    }

    async fn create(&self, _new: &NewProfile, _access: Access) -> Result<Profile, RepositoryError> {
        Err(RepositoryError::AccessDenied)
    }

    async fn upsert(&self, _profile: &NewProfile) -> Result<Profile, RepositoryError> {
        Err(RepositoryError::AccessDenied)
    }
}

fn identity(email: &str, app_role: Option<&str>) -> SessionIdentity {
    SessionIdentity {
        id: ProfileId::generate(),
        email: Email::parse(email).unwrap(),
        user_role: None,
        app_role: app_role.map(str::to_owned),
    }
}

fn redirect_target(decision: &GuardDecision) -> Option<&'static str> {
    match decision {
        GuardDecision::Redirect(to) => Some(*to),
        _ => None,
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn test_no_session_admin_path_redirects_to_admin_signin() {
    let decision = authorize("/admin/x", None, None, &Profiles::default()).await;
    assert_eq!(redirect_target(&decision), Some(ADMIN_SIGNIN));
}

#[tokio::test]
async fn test_client_on_admin_path_redirects_to_admin_signin() {
    let client = identity("client@shop.com", None);
    let profiles = Profiles::default().with(&client, Role::Client);

    let decision = authorize("/admin/x", None, Some(&client), &profiles).await;
    assert_eq!(redirect_target(&decision), Some(ADMIN_SIGNIN));
}

#[tokio::test]
async fn test_admin_on_admin_path_passes() {
    let admin = identity("admin@storecast.io", Some("admin"));
    let profiles = Profiles::default().with(&admin, Role::Admin);

    let decision = authorize("/admin/x", None, Some(&admin), &profiles).await;
    match decision {
        GuardDecision::Allow(user) => assert!(user.is_admin()),
        other => panic!("expected Allow, got {other:?}"),
    }
}

#[tokio::test]
async fn test_admin_viewing_client_dashboard_passes() {
    let admin = identity("admin@storecast.io", Some("admin"));
    let profiles = Profiles::default().with(&admin, Role::Admin);
    let query = format!("admin_view={}", ProfileId::generate());

    let decision = authorize("/dashboard", Some(&query), Some(&admin), &profiles).await;
    assert!(matches!(decision, GuardDecision::Allow(_)));
}

#[tokio::test]
async fn test_admin_on_dashboard_without_view_target_redirects() {
    let admin = identity("admin@storecast.io", Some("admin"));
    let profiles = Profiles::default().with(&admin, Role::Admin);

    let decision = authorize("/dashboard", Some("view=grid"), Some(&admin), &profiles).await;
    assert_eq!(redirect_target(&decision), Some(CLIENT_SIGNIN));
}

#[tokio::test]
async fn test_profile_lookup_failure_redirects_to_client_signin() {
    let client = identity("client@shop.com", None);
    let profiles = Profiles {
        broken: true,
        ..Profiles::default()
    };

    let decision = authorize("/dashboard/x", None, Some(&client), &profiles).await;
    assert_eq!(redirect_target(&decision), Some(CLIENT_SIGNIN));
}

#[tokio::test]
async fn test_missing_profile_redirects() {
    let client = identity("client@shop.com", None);
    let decision = authorize("/dashboard", None, Some(&client), &Profiles::default()).await;
    assert_eq!(redirect_target(&decision), Some(CLIENT_SIGNIN));
}

#[tokio::test]
async fn test_unprotected_paths_pass_without_session() {
    for path in ["/", "/auth/client/signin", "/health", "/administrator"] {
        let decision = authorize(path, None, None, &Profiles::default()).await;
        assert!(matches!(decision, GuardDecision::Pass), "{path}");
    }
}

// =============================================================================
// Router
// =============================================================================

fn config() -> AppConfig {
    AppConfig {
        database_url: SecretString::from("postgres://127.0.0.1:1/storecast_test"),
        host: IpAddr::from([127, 0, 0, 1]),
        port: 3000,
        base_url: "http://localhost:3000".to_owned(),
        storage: StorageConfig {
            url: "http://storage.local".to_owned(),
            bucket: "content".to_owned(),
            service_key: SecretString::from("k3Y$9vQ!zT2#pL7@wR4^mN8&xB1*cD6%"),
        },
        max_upload_bytes: 1024 * 1024,
        invite_ttl_hours: 168,
        log_json: false,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// The full router over a pool that never connects, so every profile lookup
/// fails quickly.
fn router_with(store: MemoryStore) -> axum::Router {
    let config = config();
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(200))
        .connect_lazy("postgres://127.0.0.1:1/storecast_test")
        .unwrap();
    let layer = session_layer(store, &config);
    storecast_app::app(AppState::new(config, pool), layer)
}

fn router() -> axum::Router {
    router_with(MemoryStore::default())
}

/// Save a signed-in identity straight into the store and return the cookie
/// that carries it.
async fn signed_in_cookie(store: &MemoryStore, identity: &SessionIdentity) -> String {
    let session = Session::new(None, Arc::new(store.clone()), None);
    session.insert(session_keys::IDENTITY, identity).await.unwrap();
    session.save().await.unwrap();
    format!("{SESSION_COOKIE_NAME}={}", session.id().unwrap())
}

/// Follow redirects with a fixed cookie until a page renders. Returns the
/// path that rendered, or panics after too many hops.
async fn follow(app: &axum::Router, start: &str, cookie: &str) -> String {
    let mut uri = start.to_owned();
    for _ in 0..6 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(&uri)
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        if response.status() != StatusCode::SEE_OTHER {
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            return uri;
        }
        uri = response.headers()[header::LOCATION]
            .to_str()
            .unwrap()
            .to_owned();
    }
    panic!("no page rendered from {start} within 6 redirects");
}

async fn get(uri: &str) -> axum::response::Response {
    router()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_router_redirects_without_session() {
    for (uri, target) in [
        ("/dashboard", CLIENT_SIGNIN),
        ("/dashboard/api/stores", CLIENT_SIGNIN),
        ("/admin", ADMIN_SIGNIN),
        ("/admin/clients", ADMIN_SIGNIN),
    ] {
        let response = get(uri).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(response.headers()[header::LOCATION], target, "{uri}");
    }
}

#[tokio::test]
async fn test_root_redirects_to_signin_without_session() {
    let response = get("/").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], CLIENT_SIGNIN);
}

#[tokio::test]
async fn test_health_carries_request_id_and_security_headers() {
    let response = get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert!(headers.contains_key("x-request-id"));
    assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
    assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    let csp = headers[header::CONTENT_SECURITY_POLICY].to_str().unwrap();
    assert!(csp.contains("http://storage.local"));
}

#[tokio::test]
async fn test_rejected_session_lands_on_signin_form() {
    let store = MemoryStore::default();
    let app = router_with(store.clone());

    let client = identity("client@shop.com", None);
    let cookie = signed_in_cookie(&store, &client).await;
    assert_eq!(follow(&app, "/dashboard", &cookie).await, CLIENT_SIGNIN);
    assert_eq!(follow(&app, "/", &cookie).await, CLIENT_SIGNIN);

    let admin = identity("admin@shop.com", Some("admin"));
    let cookie = signed_in_cookie(&store, &admin).await;
    assert_eq!(follow(&app, "/dashboard", &cookie).await, CLIENT_SIGNIN);
    assert_eq!(follow(&app, "/", &cookie).await, ADMIN_SIGNIN);
}
