//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::db::{
    ContentRepository, IdentityRepository, InviteRepository, ProfileRepository, StoreRepository,
};
use crate::services::{MediaStore, StorageClient};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    pool: PgPool,
    media: Arc<dyn MediaStore>,
}

impl AppState {
    /// Create a new application state backed by the hosted storage API.
    #[must_use]
    pub fn new(config: AppConfig, pool: PgPool) -> Self {
        let media = Arc::new(StorageClient::new(config.storage.clone()));
        Self::with_media(config, pool, media)
    }

    /// Create application state with a specific media store.
    #[must_use]
    pub fn with_media(config: AppConfig, pool: PgPool, media: Arc<dyn MediaStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                media,
            }),
        }
    }

    /// Get a reference to the application configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the media store.
    #[must_use]
    pub fn media(&self) -> &dyn MediaStore {
        self.inner.media.as_ref()
    }

    #[must_use]
    pub fn profiles(&self) -> ProfileRepository<'_> {
        ProfileRepository::new(self.pool())
    }

    #[must_use]
    pub fn identities(&self) -> IdentityRepository<'_> {
        IdentityRepository::new(self.pool())
    }

    #[must_use]
    pub fn content(&self) -> ContentRepository<'_> {
        ContentRepository::new(self.pool())
    }

    #[must_use]
    pub fn stores(&self) -> StoreRepository<'_> {
        StoreRepository::new(self.pool())
    }

    #[must_use]
    pub fn invites(&self) -> InviteRepository<'_> {
        InviteRepository::new(self.pool())
    }
}
