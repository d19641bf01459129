//! Content upload and deletion.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use storecast_core::{
    ContentId, ContentType, ProfileId, RecurrenceType, StoreId, parse_timestamp,
};

use super::steps::{StepKind, StepLog};
use super::storage::{MediaStore, StorageError, sanitize_file_name};
use crate::db::{ContentRecords, RepositoryError};
use crate::models::{ContentItem, NewContent};

/// Errors from content operations.
#[derive(Debug, Error)]
pub enum ContentError {
    /// The client has no stores yet.
    #[error("Create a store before uploading content")]
    NoStores,

    /// The target store is not the caller's.
    #[error("You can only upload to your own stores")]
    StoreNotOwned,

    /// A form field is missing or invalid.
    #[error("{0}")]
    Invalid(String),

    /// Content does not exist or is not the caller's.
    #[error("content not found")]
    NotFound,

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Raw upload form fields, as received.
#[derive(Debug, Default, Clone)]
pub struct UploadForm {
    pub title: Option<String>,
    pub content_type: Option<String>,
    pub store_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub recurrence_type: Option<String>,
    pub recurrence_days: Option<String>,
    pub file_name: Option<String>,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

/// A validated upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub title: String,
    pub content_type: ContentType,
    pub store_id: StoreId,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub recurrence_type: RecurrenceType,
    pub recurrence_days: Vec<String>,
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

fn required<'f>(value: Option<&'f String>, field: &str) -> Result<&'f str, ContentError> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ContentError::Invalid(format!("{field} is required")))
}

impl UploadForm {
    /// Validate the fields into an [`UploadRequest`].
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Invalid` naming the first bad field.
    pub fn validate(self, max_bytes: usize) -> Result<UploadRequest, ContentError> {
        let title = required(self.title.as_ref(), "Title")?.to_owned();

        let mime = self
            .mime
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_owned());
        let content_type = match self.content_type.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => raw
                .parse::<ContentType>()
                .map_err(ContentError::Invalid)?,
            _ => ContentType::from_mime(&mime)
                .ok_or_else(|| ContentError::Invalid("Content type is required".to_owned()))?,
        };

        let store_id = required(self.store_id.as_ref(), "Store")?
            .parse::<StoreId>()
            .map_err(|_| ContentError::Invalid("Invalid store".to_owned()))?;

        let start_date = parse_timestamp(required(self.start_date.as_ref(), "Start date")?)
            .ok_or_else(|| ContentError::Invalid("Invalid start date".to_owned()))?;
        let end_date = parse_timestamp(required(self.end_date.as_ref(), "End date")?)
            .ok_or_else(|| ContentError::Invalid("Invalid end date".to_owned()))?;
        if end_date < start_date {
            return Err(ContentError::Invalid(
                "End date must be on or after the start date".to_owned(),
            ));
        }

        let recurrence_type = self
            .recurrence_type
            .as_deref()
            .unwrap_or_default()
            .parse::<RecurrenceType>()
            .map_err(ContentError::Invalid)?;
        let recurrence_days = parse_days(self.recurrence_days.as_deref().unwrap_or_default());

        if self.bytes.is_empty() {
            return Err(ContentError::Invalid("File is required".to_owned()));
        }
        if self.bytes.len() > max_bytes {
            return Err(ContentError::Invalid(format!(
                "File exceeds the {} MB limit",
                max_bytes / (1024 * 1024)
            )));
        }

        Ok(UploadRequest {
            title,
            content_type,
            store_id,
            start_date,
            end_date,
            recurrence_type,
            recurrence_days,
            file_name: sanitize_file_name(self.file_name.as_deref().unwrap_or_default()),
            mime,
            bytes: self.bytes,
        })
    }
}

/// Split a comma list of days into trimmed lowercase entries.
#[must_use]
pub fn parse_days(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|d| d.trim().to_lowercase())
        .filter(|d| !d.is_empty())
        .collect()
}

/// Content upload/delete service.
pub struct ContentService<'a> {
    records: &'a dyn ContentRecords,
    media: &'a dyn MediaStore,
}

impl<'a> ContentService<'a> {
    #[must_use]
    pub const fn new(records: &'a dyn ContentRecords, media: &'a dyn MediaStore) -> Self {
        Self { records, media }
    }

    /// Store the file, then insert the record.
    ///
    /// Not transactional: if the insert fails the stored object is left
    /// behind and logged.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::NoStores` / `StoreNotOwned` when the store
    /// preconditions fail, `Storage` or `Repository` on backend failures.
    #[tracing::instrument(skip(self, request), fields(owner_id = %owner, title = %request.title))]
    pub async fn upload(
        &self,
        owner: ProfileId,
        request: UploadRequest,
    ) -> Result<ContentItem, ContentError> {
        let stores = self.records.owned_store_ids(owner).await?;
        if stores.is_empty() {
            return Err(ContentError::NoStores);
        }
        if !stores.contains(&request.store_id) {
            return Err(ContentError::StoreNotOwned);
        }

        let path = format!("{owner}/{}-{}", Uuid::new_v4(), request.file_name);
        let file_size = i64::try_from(request.bytes.len()).unwrap_or(i64::MAX);
        let file_url = self
            .media
            .upload(&path, &request.mime, request.bytes)
            .await?;

        let new = NewContent {
            store_id: request.store_id,
            owner_id: owner,
            title: request.title,
            content_type: request.content_type,
            file_url,
            file_size,
            start_date: request.start_date,
            end_date: request.end_date,
            recurrence_type: request.recurrence_type,
            recurrence_days: request.recurrence_days,
        };

        match self.records.insert(&new).await {
            Ok(item) => {
                tracing::info!(content_id = %item.id, "Content uploaded");
                Ok(item)
            }
            Err(e) => {
                tracing::error!(
                    object_path = %path,
                    error = %e,
                    "Record insert failed after upload, stored object is orphaned"
                );
                Err(e.into())
            }
        }
    }

    /// Delete the stored object (best effort), then the record (primary).
    ///
    /// # Errors
    ///
    /// Returns `ContentError::NotFound` if the content is missing or owned by
    /// someone else. Step failures are reported in the returned log.
    #[tracing::instrument(skip(self), fields(owner_id = %owner, content_id = %id))]
    pub async fn delete(&self, owner: ProfileId, id: ContentId) -> Result<StepLog, ContentError> {
        let item = self
            .records
            .find(id)
            .await?
            .filter(|item| item.owner_id == owner)
            .ok_or(ContentError::NotFound)?;

        let mut log = StepLog::new("delete_content");

        let removed = match self.media.object_path(&item.file_url) {
            Ok(path) => self.media.delete(&path).await,
            Err(e) => Err(e),
        };
        log.record("delete_object", StepKind::BestEffort, removed);
        log.record("delete_record", StepKind::Primary, self.records.delete(id).await);

        Ok(log)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryContent, InMemoryMedia};

    fn form(store_id: StoreId) -> UploadForm {
        UploadForm {
            title: Some(" Spring promo ".to_owned()),
            content_type: Some("video".to_owned()),
            store_id: Some(store_id.to_string()),
            start_date: Some("2026-03-01".to_owned()),
            end_date: Some("2026-03-31T18:00".to_owned()),
            recurrence_type: Some("weekly".to_owned()),
            recurrence_days: Some("Mon, fri,".to_owned()),
            file_name: Some("promo clip.mp4".to_owned()),
            mime: Some("video/mp4".to_owned()),
            bytes: vec![1, 2, 3],
        }
    }

    #[test]
    fn test_validate_form() {
        let request = form(StoreId::generate()).validate(1024).unwrap();
        assert_eq!(request.title, "Spring promo");
        assert_eq!(request.content_type, ContentType::Video);
        assert_eq!(request.recurrence_type, RecurrenceType::Weekly);
        assert_eq!(request.recurrence_days, vec!["mon", "fri"]);
        assert_eq!(request.file_name, "promo_clip.mp4");
    }

    #[test]
    fn test_validate_rejects_inverted_dates() {
        let mut bad = form(StoreId::generate());
        bad.end_date = Some("2026-02-01".to_owned());
        assert!(matches!(bad.validate(1024), Err(ContentError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_empty_and_oversized_files() {
        let mut empty = form(StoreId::generate());
        empty.bytes.clear();
        assert!(empty.validate(1024).is_err());

        let big = form(StoreId::generate());
        assert!(big.validate(2).is_err());
    }

    #[test]
    fn test_validate_infers_type_from_mime() {
        let mut untyped = form(StoreId::generate());
        untyped.content_type = None;
        untyped.mime = Some("audio/mpeg".to_owned());
        assert_eq!(
            untyped.validate(1024).unwrap().content_type,
            ContentType::Music
        );
    }

    #[tokio::test]
    async fn test_upload_requires_a_store() {
        let records = InMemoryContent::default();
        let media = InMemoryMedia::default();
        let service = ContentService::new(&records, &media);
        let owner = ProfileId::generate();

        let request = form(StoreId::generate()).validate(1024).unwrap();
        let err = service.upload(owner, request).await.unwrap_err();
        assert!(matches!(err, ContentError::NoStores));
        assert_eq!(media.object_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_rejects_foreign_store() {
        let records = InMemoryContent::default();
        let media = InMemoryMedia::default();
        let owner = ProfileId::generate();
        records.add_store(owner, StoreId::generate());
        let service = ContentService::new(&records, &media);

        let request = form(StoreId::generate()).validate(1024).unwrap();
        let err = service.upload(owner, request).await.unwrap_err();
        assert!(matches!(err, ContentError::StoreNotOwned));
    }

    #[tokio::test]
    async fn test_upload_stores_object_under_owner_prefix() {
        let records = InMemoryContent::default();
        let media = InMemoryMedia::default();
        let owner = ProfileId::generate();
        let store = StoreId::generate();
        records.add_store(owner, store);
        let service = ContentService::new(&records, &media);

        let item = service
            .upload(owner, form(store).validate(1024).unwrap())
            .await
            .unwrap();
        assert_eq!(item.owner_id, owner);
        assert_eq!(item.file_size, 3);
        let path = media.object_path(&item.file_url).unwrap();
        assert!(path.starts_with(&format!("{owner}/")));
        assert!(path.ends_with("-promo_clip.mp4"));
    }

    #[tokio::test]
    async fn test_failed_insert_leaves_object_orphaned() {
        let records = InMemoryContent::default();
        let media = InMemoryMedia::default();
        let owner = ProfileId::generate();
        let store = StoreId::generate();
        records.add_store(owner, store);
        records.fail_inserts();
        let service = ContentService::new(&records, &media);

        let err = service
            .upload(owner, form(store).validate(1024).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::Repository(_)));
        assert_eq!(media.object_count(), 1);
    }

    #[tokio::test]
    async fn test_delete_succeeds_when_storage_delete_fails() {
        let records = InMemoryContent::default();
        let media = InMemoryMedia::default();
        let owner = ProfileId::generate();
        let store = StoreId::generate();
        records.add_store(owner, store);
        let service = ContentService::new(&records, &media);
        let item = service
            .upload(owner, form(store).validate(1024).unwrap())
            .await
            .unwrap();

        media.fail_deletes();
        let log = service.delete(owner, item.id).await.unwrap();
        assert!(log.succeeded());
        assert_eq!(log.warnings(), vec!["delete_object"]);
        assert!(records.find(item.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_other_owners_content_is_not_found() {
        let records = InMemoryContent::default();
        let media = InMemoryMedia::default();
        let owner = ProfileId::generate();
        let store = StoreId::generate();
        records.add_store(owner, store);
        let service = ContentService::new(&records, &media);
        let item = service
            .upload(owner, form(store).validate(1024).unwrap())
            .await
            .unwrap();

        let err = service
            .delete(ProfileId::generate(), item.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::NotFound));
    }
}
