//! Registration Orchestrator.

use crate::{errors::*, store::CredentialStore, traits::*, types::*};
use async_trait::async_trait;
use registration_oauth::{OAuthError, OAuthHandler};
use registration_storage::StorageError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default deadline for one provider round trip
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Default deadline for one store operation
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Registration service implementation
pub struct RegistrationService<O, C>
where
    O: OAuthHandler,
    C: CredentialStore,
{
    oauth: Arc<O>,
    store: Arc<C>,
    upstream_timeout: Duration,
    store_timeout: Duration,
}

impl<O, C> RegistrationService<O, C>
where
    O: OAuthHandler,
    C: CredentialStore,
{
    /// Create a new registration service with default timeouts
    pub fn new(oauth: Arc<O>, store: Arc<C>) -> Self {
        Self::with_timeouts(oauth, store, DEFAULT_UPSTREAM_TIMEOUT, DEFAULT_STORE_TIMEOUT)
    }

    pub fn with_timeouts(
        oauth: Arc<O>,
        store: Arc<C>,
        upstream_timeout: Duration,
        store_timeout: Duration,
    ) -> Self {
        Self {
            oauth,
            store,
            upstream_timeout,
            store_timeout,
        }
    }

    /// Run a provider call under the upstream deadline
    async fn upstream<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = registration_oauth::Result<T>> + Send,
    {
        match tokio::time::timeout(self.upstream_timeout, call).await {
            Ok(result) => result.map_err(RegistrationError::UpstreamAuth),
            Err(_) => Err(RegistrationError::UpstreamAuth(OAuthError::Timeout(
                self.upstream_timeout,
            ))),
        }
    }

    /// Run a store call under the store deadline
    async fn stored<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = registration_storage::Result<T>> + Send,
    {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(result) => result.map_err(RegistrationError::StoreUnavailable),
            Err(_) => Err(RegistrationError::StoreUnavailable(StorageError::Timeout(
                self.store_timeout,
            ))),
        }
    }

    /// First stored record for the screen name
    async fn load_credential(&self, screen_name: &str) -> Result<Option<UserCredential>> {
        let mut records = self
            .stored(self.store.find_by_screen_name(screen_name))
            .await?;

        if records.len() > 1 {
            warn!(
                screen_name = %screen_name,
                count = records.len(),
                "Multiple credential records stored; using the oldest"
            );
        }

        Ok(if records.is_empty() {
            None
        } else {
            Some(records.remove(0))
        })
    }
}

/// Trimmed screen name, or `InvalidScreenName` when blank
fn normalize_screen_name(screen_name: &str) -> Result<&str> {
    let trimmed = screen_name.trim();
    if trimmed.is_empty() {
        return Err(RegistrationError::InvalidScreenName(screen_name.to_string()));
    }
    Ok(trimmed)
}

#[async_trait]
impl<O, C> Registration for RegistrationService<O, C>
where
    O: OAuthHandler + 'static,
    C: CredentialStore + 'static,
{
    async fn initiate_registration(&self, screen_name: &str) -> Result<String> {
        let screen_name = normalize_screen_name(screen_name)?;
        info!(screen_name = %screen_name, "Initiating registration");

        let request_token = self.upstream(self.oauth.get_request_token()).await?;
        let authorization_url = self.oauth.authorization_url(&request_token)?;

        let credential = UserCredential::pending(screen_name, &request_token);
        let removed = self.stored(self.store.replace(&credential)).await?;

        info!(
            screen_name = %screen_name,
            record_id = %credential.record_id,
            request_token = %token_fingerprint(&request_token.token),
            replaced = removed,
            "Registration pending verification"
        );

        Ok(authorization_url)
    }

    async fn finalize_registration(
        &self,
        screen_name: &str,
        verification_token: &str,
    ) -> Result<()> {
        let screen_name = normalize_screen_name(screen_name)?;
        info!(screen_name = %screen_name, "Finalizing registration");

        let credential = self
            .load_credential(screen_name)
            .await?
            .ok_or_else(|| RegistrationError::NotFound(screen_name.to_string()))?;

        if credential.state() == RegistrationState::Verified {
            debug!(
                screen_name = %screen_name,
                record_id = %credential.record_id,
                "Record already verified; exchanging again"
            );
        }

        let request_token = credential.request_token_pair();
        let access_token = self
            .upstream(
                self.oauth
                    .get_access_token(&request_token, verification_token),
            )
            .await
            .map_err(|e| {
                warn!(
                    screen_name = %screen_name,
                    request_token = %token_fingerprint(&request_token.token),
                    error = %e,
                    "Access token exchange failed"
                );
                e
            })?;

        let access_fingerprint = token_fingerprint(&access_token.token);
        let verified = credential.verified(access_token);

        // A registration restarted while the exchange was in flight owns the
        // screen name now; the record this flow loaded is gone.
        if !self.stored(self.store.update_if_present(&verified)).await? {
            warn!(
                screen_name = %screen_name,
                record_id = %verified.record_id,
                "Registration superseded during access token exchange"
            );
            return Err(RegistrationError::NotFound(screen_name.to_string()));
        }

        info!(
            screen_name = %screen_name,
            record_id = %verified.record_id,
            access_token = %access_fingerprint,
            "Registration verified"
        );

        Ok(())
    }

    async fn registration_state(&self, screen_name: &str) -> Result<RegistrationState> {
        let screen_name = normalize_screen_name(screen_name)?;

        Ok(self
            .load_credential(screen_name)
            .await?
            .map(|c| c.state())
            .unwrap_or(RegistrationState::Absent))
    }
}
