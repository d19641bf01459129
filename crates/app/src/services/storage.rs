//! Object storage for uploaded media.
//!
//! [`MediaStore`] is the seam; [`StorageClient`] talks to the hosted storage
//! REST API.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::StorageConfig;

/// Errors from the storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The storage API returned a non-success status.
    #[error("storage API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The URL does not point into this bucket.
    #[error("not a storage URL for this bucket: {0}")]
    ForeignUrl(String),
}

/// Stores media objects and maps them to public URLs.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Upload an object and return its public URL.
    async fn upload(&self, path: &str, mime: &str, bytes: Vec<u8>) -> Result<String, StorageError>;

    /// Delete an object.
    async fn delete(&self, path: &str) -> Result<(), StorageError>;

    /// Public URL for an object path.
    fn public_url(&self, path: &str) -> String;

    /// Object path for a public URL produced by [`MediaStore::public_url`].
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ForeignUrl` for any other URL.
    fn object_path(&self, url: &str) -> Result<String, StorageError>;
}

/// Client for the hosted storage REST API.
#[derive(Clone)]
pub struct StorageClient {
    http: reqwest::Client,
    config: StorageConfig,
}

impl StorageClient {
    #[must_use]
    pub fn new(config: StorageConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn base(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.config.service_key.expose_secret())
    }

    fn public_prefix(&self) -> String {
        format!(
            "{}/storage/v1/object/public/{}/",
            self.base(),
            self.config.bucket
        )
    }

    async fn check(response: reqwest::Response) -> Result<(), StorageError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let message = response.text().await.unwrap_or_default();
        Err(StorageError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl MediaStore for StorageClient {
    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload(&self, path: &str, mime: &str, bytes: Vec<u8>) -> Result<String, StorageError> {
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base(),
            self.config.bucket,
            path
        );

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, self.bearer())
            .header(CONTENT_TYPE, mime)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;
        Self::check(response).await?;

        Ok(self.public_url(path))
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let url = format!("{}/storage/v1/object/{}", self.base(), self.config.bucket);

        let response = self
            .http
            .delete(&url)
            .header(AUTHORIZATION, self.bearer())
            .json(&serde_json::json!({ "prefixes": [path] }))
            .send()
            .await?;
        Self::check(response).await
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}{}", self.public_prefix(), path)
    }

    fn object_path(&self, url: &str) -> Result<String, StorageError> {
        url.strip_prefix(&self.public_prefix())
            .filter(|path| !path.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| StorageError::ForeignUrl(url.to_owned()))
    }
}

/// Make an uploaded file name safe for an object path.
///
/// Keeps ASCII alphanumerics, `.`, `-` and `_`; everything else becomes `_`.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_owned()
    } else {
        cleaned.to_owned()
    }
}
