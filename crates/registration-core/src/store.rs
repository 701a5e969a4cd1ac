//! Credential Store Adapter.
//!
//! Maps a screen name to the [`UserCredential`] records stored for it.
//! Records live in [`CF_USER_CREDENTIALS`] under `(screen_name, record_id)`,
//! so a prefix scan on the screen name returns every record for it.

use async_trait::async_trait;
use registration_storage::{BatchExt, Result, Storage, CF_USER_CREDENTIALS};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::types::UserCredential;

const LOCK_STRIPES: usize = 64;

/// Persistence contract for user credentials
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// All records for a screen name, oldest first. Normally zero or one.
    async fn find_by_screen_name(&self, screen_name: &str) -> Result<Vec<UserCredential>>;

    /// Persist a new record. Performs no existence check.
    async fn insert(&self, credential: &UserCredential) -> Result<()>;

    /// Remove one specific record
    async fn delete(&self, credential: &UserCredential) -> Result<()>;

    /// Atomically delete every record for `credential.screen_name` and write
    /// `credential`. Returns how many records were removed.
    ///
    /// Concurrent calls for the same screen name are serialized, so the
    /// screen name always ends with exactly one record.
    async fn replace(&self, credential: &UserCredential) -> Result<usize>;

    /// Like [`replace`](CredentialStore::replace), but only while the record
    /// `(screen_name, record_id)` is still stored. Returns `false` and writes
    /// nothing when a newer registration has superseded it.
    async fn update_if_present(&self, credential: &UserCredential) -> Result<bool>;
}

/// [`CredentialStore`] over any [`Storage`] engine
pub struct StorageCredentialStore<S: Storage> {
    storage: Arc<S>,
    locks: Vec<Mutex<()>>,
}

impl<S: Storage> StorageCredentialStore<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            locks: (0..LOCK_STRIPES).map(|_| Mutex::new(())).collect(),
        }
    }

    fn lock_for(&self, screen_name: &str) -> &Mutex<()> {
        let mut hasher = DefaultHasher::new();
        screen_name.hash(&mut hasher);
        &self.locks[(hasher.finish() as usize) % self.locks.len()]
    }

    async fn load(&self, screen_name: &str) -> Result<Vec<UserCredential>> {
        let records: Vec<(Vec<u8>, UserCredential)> = self
            .storage
            .get_by_prefix(CF_USER_CREDENTIALS, &screen_name.to_string())
            .await?;

        let mut credentials: Vec<UserCredential> =
            records.into_iter().map(|(_, credential)| credential).collect();
        // Timestamps have one-second resolution; the record id breaks ties.
        credentials.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.record_id.cmp(&b.record_id))
        });

        trace!(
            screen_name = %screen_name,
            count = credentials.len(),
            "Loaded credential records"
        );

        Ok(credentials)
    }

    /// Delete every other record in `existing` and write `credential` in one
    /// batch. Callers hold the screen name's stripe lock.
    async fn swap_in(&self, credential: &UserCredential, existing: &[UserCredential]) -> Result<usize> {
        let mut batch = self.storage.batch();
        let mut removed = 0;
        for old in existing.iter().filter(|old| old.record_id != credential.record_id) {
            batch.delete(CF_USER_CREDENTIALS, &old.storage_key())?;
            removed += 1;
        }
        batch.put(CF_USER_CREDENTIALS, &credential.storage_key(), credential)?;
        batch.commit().await?;

        debug!(
            screen_name = %credential.screen_name,
            record_id = %credential.record_id,
            removed,
            "Replaced credential records"
        );
        Ok(removed)
    }
}

#[async_trait]
impl<S: Storage + 'static> CredentialStore for StorageCredentialStore<S> {
    async fn find_by_screen_name(&self, screen_name: &str) -> Result<Vec<UserCredential>> {
        self.load(screen_name).await
    }

    async fn insert(&self, credential: &UserCredential) -> Result<()> {
        self.storage
            .put(CF_USER_CREDENTIALS, &credential.storage_key(), credential)
            .await?;

        debug!(
            screen_name = %credential.screen_name,
            record_id = %credential.record_id,
            "Inserted credential record"
        );
        Ok(())
    }

    async fn delete(&self, credential: &UserCredential) -> Result<()> {
        self.storage
            .delete(CF_USER_CREDENTIALS, &credential.storage_key())
            .await?;

        debug!(
            screen_name = %credential.screen_name,
            record_id = %credential.record_id,
            "Deleted credential record"
        );
        Ok(())
    }

    async fn replace(&self, credential: &UserCredential) -> Result<usize> {
        let _guard = self.lock_for(&credential.screen_name).lock().await;

        let existing = self.load(&credential.screen_name).await?;
        self.swap_in(credential, &existing).await
    }

    async fn update_if_present(&self, credential: &UserCredential) -> Result<bool> {
        let _guard = self.lock_for(&credential.screen_name).lock().await;

        let existing = self.load(&credential.screen_name).await?;
        if !existing.iter().any(|c| c.record_id == credential.record_id) {
            debug!(
                screen_name = %credential.screen_name,
                record_id = %credential.record_id,
                "Credential record superseded; update skipped"
            );
            return Ok(false);
        }

        self.swap_in(credential, &existing).await?;
        Ok(true)
    }
}
