use anyhow::Result;
use registration_core::{Registration, RegistrationService, StorageCredentialStore};
use registration_oauth::{OAuthClient, OAuthConfig};
use registration_storage::RocksDbStorage;
use std::sync::Arc;

use crate::config::Config;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Owned here so shutdown can flush it
    pub storage: Arc<RocksDbStorage>,
    pub registration: Arc<dyn Registration>,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self> {
        let storage = Arc::new(RocksDbStorage::open(&config.database_path)?);
        tracing::info!(path = %config.database_path.display(), "Credential store opened");

        let oauth_config = OAuthConfig::twitter(
            config.consumer_key.clone(),
            config.consumer_secret.clone(),
        )
        .with_callback(config.oauth_callback.clone())
        .with_timeout(config.oauth_timeout);
        let oauth = Arc::new(OAuthClient::new(oauth_config)?);

        let store = Arc::new(StorageCredentialStore::new(storage.clone()));

        let registration: Arc<dyn Registration> = Arc::new(RegistrationService::with_timeouts(
            oauth,
            store,
            config.oauth_timeout,
            config.store_timeout,
        ));

        Ok(AppState {
            config,
            storage,
            registration,
        })
    }
}
