//! In-memory implementations of the storage seams for unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use storecast_core::{ContentId, Email, ProfileId, Role, StoreId};

use crate::db::{
    Access, ContentRecords, IdentityRecords, NewIdentity, ProfileStore, RepositoryError,
};
use crate::models::{ContentItem, Identity, NewContent, NewProfile, Profile};
use crate::services::storage::{MediaStore, StorageError};

fn unavailable() -> RepositoryError {
    RepositoryError::Database(sqlx::Error::PoolTimedOut)
}

#[derive(Default)]
pub struct InMemoryProfiles {
    rows: Mutex<HashMap<ProfileId, Profile>>,
    fail_all: AtomicBool,
    fail_writes: AtomicBool,
}

impl InMemoryProfiles {
    /// A store whose every call fails.
    pub fn failing() -> Self {
        let store = Self::default();
        store.fail_all.store(true, Ordering::SeqCst);
        store
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn insert(&self, id: ProfileId, email: &Email, role: Role) {
        let profile = Profile {
            id,
            email: email.clone(),
            role,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().insert(id, profile);
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn role_of(&self, id: ProfileId) -> Option<Role> {
        self.rows.lock().unwrap().get(&id).map(|p| p.role)
    }

    fn check(&self, writing: bool) -> Result<(), RepositoryError> {
        if self.fail_all.load(Ordering::SeqCst)
            || (writing && self.fail_writes.load(Ordering::SeqCst))
        {
            return Err(unavailable());
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfiles {
    async fn find(
        &self,
        id: ProfileId,
        access: Access,
    ) -> Result<Option<Profile>, RepositoryError> {
        self.check(false)?;
        if !access.reaches(id) {
            return Err(RepositoryError::AccessDenied);
        }
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn create(&self, new: &NewProfile, access: Access) -> Result<Profile, RepositoryError> {
        self.check(true)?;
        if !access.reaches(new.id)
            || (matches!(access, Access::Owner(_)) && new.role.is_admin())
        {
            return Err(RepositoryError::AccessDenied);
        }
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(&new.id) {
            return Err(RepositoryError::Conflict("profile already exists".to_owned()));
        }
        let profile = new.synthetic(Utc::now());
        rows.insert(new.id, profile.clone());
        Ok(profile)
    }

    async fn upsert(&self, new: &NewProfile) -> Result<Profile, RepositoryError> {
        self.check(true)?;
        let mut rows = self.rows.lock().unwrap();
        let created_at = rows.get(&new.id).map_or_else(Utc::now, |p| p.created_at);
        let profile = Profile {
            id: new.id,
            email: new.email.clone(),
            role: new.role,
            created_at,
        };
        rows.insert(new.id, profile.clone());
        Ok(profile)
    }
}

#[derive(Default)]
pub struct InMemoryIdentities {
    rows: Mutex<Vec<Identity>>,
}

impl InMemoryIdentities {
    fn update(
        &self,
        id: ProfileId,
        f: impl FnOnce(&mut Identity),
    ) -> Result<(), RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(RepositoryError::NotFound)?;
        f(row);
        Ok(())
    }
}

#[async_trait]
impl IdentityRecords for InMemoryIdentities {
    async fn find(&self, id: ProfileId) -> Result<Option<Identity>, RepositoryError> {
        Ok(self.rows.lock().unwrap().iter().find(|i| i.id == id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Identity>, RepositoryError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|i| &i.email == email)
            .cloned())
    }

    async fn create(&self, new: &NewIdentity) -> Result<Identity, RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|i| i.email == new.email) {
            return Err(RepositoryError::Conflict("email already registered".to_owned()));
        }
        let identity = Identity {
            id: ProfileId::generate(),
            email: new.email.clone(),
            password_hash: new.password_hash.clone(),
            user_role_claim: new.user_role_claim.clone(),
            app_role_claim: new.app_role_claim.clone(),
            created_at: Utc::now(),
        };
        rows.push(identity.clone());
        Ok(identity)
    }

    async fn set_password_hash(&self, id: ProfileId, hash: &str) -> Result<(), RepositoryError> {
        self.update(id, |i| i.password_hash = hash.to_owned())
    }

    async fn set_app_role(&self, id: ProfileId, role: Role) -> Result<(), RepositoryError> {
        self.update(id, |i| i.app_role_claim = Some(role.as_str().to_owned()))
    }

    async fn set_email(&self, id: ProfileId, email: &Email) -> Result<(), RepositoryError> {
        if self
            .rows
            .lock()
            .unwrap()
            .iter()
            .any(|i| i.id != id && &i.email == email)
        {
            return Err(RepositoryError::Conflict("email already registered".to_owned()));
        }
        self.update(id, |i| i.email = email.clone())
    }
}

#[derive(Default)]
pub struct InMemoryContent {
    stores: Mutex<Vec<(ProfileId, StoreId)>>,
    items: Mutex<HashMap<ContentId, ContentItem>>,
    fail_inserts: AtomicBool,
}

impl InMemoryContent {
    pub fn add_store(&self, owner: ProfileId, store: StoreId) {
        self.stores.lock().unwrap().push((owner, store));
    }

    pub fn fail_inserts(&self) {
        self.fail_inserts.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ContentRecords for InMemoryContent {
    async fn owned_store_ids(&self, owner: ProfileId) -> Result<Vec<StoreId>, RepositoryError> {
        Ok(self
            .stores
            .lock()
            .unwrap()
            .iter()
            .filter(|(o, _)| *o == owner)
            .map(|(_, s)| *s)
            .collect())
    }

    async fn find(&self, id: ContentId) -> Result<Option<ContentItem>, RepositoryError> {
        Ok(self.items.lock().unwrap().get(&id).cloned())
    }

    async fn insert(&self, new: &NewContent) -> Result<ContentItem, RepositoryError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let item = ContentItem {
            id: ContentId::generate(),
            store_id: new.store_id,
            owner_id: new.owner_id,
            title: new.title.clone(),
            content_type: new.content_type,
            file_url: new.file_url.clone(),
            file_size: new.file_size,
            start_date: Some(new.start_date),
            end_date: Some(new.end_date),
            recurrence_type: new.recurrence_type,
            recurrence_days: new.recurrence_days.clone(),
            created_at: Utc::now(),
        };
        self.items.lock().unwrap().insert(item.id, item.clone());
        Ok(item)
    }

    async fn delete(&self, id: ContentId) -> Result<(), RepositoryError> {
        self.items
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

const MEDIA_PREFIX: &str = "memory://media/";

#[derive(Default)]
pub struct InMemoryMedia {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    fail_deletes: AtomicBool,
}

impl InMemoryMedia {
    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl MediaStore for InMemoryMedia {
    async fn upload(
        &self,
        path: &str,
        _mime: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError> {
        self.objects.lock().unwrap().insert(path.to_owned(), bytes);
        Ok(self.public_url(path))
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::Api {
                status: 503,
                message: "unavailable".to_owned(),
            });
        }
        self.objects.lock().unwrap().remove(path);
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{MEDIA_PREFIX}{path}")
    }

    fn object_path(&self, url: &str) -> Result<String, StorageError> {
        url.strip_prefix(MEDIA_PREFIX)
            .map(str::to_owned)
            .ok_or_else(|| StorageError::ForeignUrl(url.to_owned()))
    }
}
