//! Test helpers and mocks for registration service tests.

use crate::*;
use async_trait::async_trait;
use registration_oauth::{AccessToken, OAuthError, OAuthHandler, RequestToken};
use registration_storage::{RocksDbStorage, StorageError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Notify;

pub const VALID_VERIFIER: &str = "123456";
pub const AUTHORIZE_URL: &str = "https://provider.test/oauth/authorize";

/// Mock OAuth provider
///
/// Issues `rtk-N`/`rsec-N` request tokens and accepts [`VALID_VERIFIER`] for
/// any issued token, answering with `atk`/`asec`.
#[derive(Default)]
pub struct MockOAuthHandler {
    issued: AtomicUsize,
    pub access_calls: AtomicUsize,
    pub reject_request_token: AtomicBool,
    pub hang: AtomicBool,
    /// When set, `get_access_token` signals `access_entered` and waits for
    /// `access_release` before answering
    pub hold_access: AtomicBool,
    pub access_entered: Notify,
    pub access_release: Notify,
}

#[async_trait]
impl OAuthHandler for MockOAuthHandler {
    async fn get_request_token(&self) -> registration_oauth::Result<RequestToken> {
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.reject_request_token.load(Ordering::SeqCst) {
            return Err(OAuthError::Rejected {
                status: 401,
                body: "Invalid consumer key".to_string(),
            });
        }

        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(RequestToken::new(format!("rtk-{}", n), format!("rsec-{}", n)))
    }

    fn authorization_url(&self, request_token: &RequestToken) -> registration_oauth::Result<String> {
        registration_oauth::client::build_authorization_url(AUTHORIZE_URL, request_token)
    }

    async fn get_access_token(
        &self,
        request_token: &RequestToken,
        verifier: &str,
    ) -> registration_oauth::Result<AccessToken> {
        self.access_calls.fetch_add(1, Ordering::SeqCst);
        if self.hold_access.load(Ordering::SeqCst) {
            self.access_entered.notify_one();
            self.access_release.notified().await;
        }
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }

        let issued = request_token
            .token
            .strip_prefix("rtk-")
            .and_then(|n| n.parse::<usize>().ok())
            .map(|n| n <= self.issued.load(Ordering::SeqCst))
            .unwrap_or(false);
        let secret_matches = request_token.secret == request_token.token.replace("rtk-", "rsec-");

        if !issued || !secret_matches || verifier != VALID_VERIFIER {
            return Err(OAuthError::Rejected {
                status: 401,
                body: "Invalid oauth_verifier".to_string(),
            });
        }

        let mut token = AccessToken::new("atk", "asec");
        token.user_id = Some("783214".to_string());
        Ok(token)
    }
}

/// Store whose every operation fails or never completes
pub struct UnavailableStore {
    pub hang: bool,
}

impl UnavailableStore {
    async fn fail<T>(&self) -> registration_storage::Result<T> {
        if self.hang {
            std::future::pending::<()>().await;
        }
        Err(StorageError::Database("connection refused".to_string()))
    }
}

#[async_trait]
impl CredentialStore for UnavailableStore {
    async fn find_by_screen_name(&self, _screen_name: &str) -> registration_storage::Result<Vec<UserCredential>> {
        self.fail().await
    }

    async fn insert(&self, _credential: &UserCredential) -> registration_storage::Result<()> {
        self.fail().await
    }

    async fn delete(&self, _credential: &UserCredential) -> registration_storage::Result<()> {
        self.fail().await
    }

    async fn replace(&self, _credential: &UserCredential) -> registration_storage::Result<usize> {
        self.fail().await
    }

    async fn update_if_present(&self, _credential: &UserCredential) -> registration_storage::Result<bool> {
        self.fail().await
    }
}

pub type TestStore = StorageCredentialStore<RocksDbStorage>;
pub type TestService = RegistrationService<MockOAuthHandler, TestStore>;

/// Service over a throwaway RocksDB and the mock provider
pub struct TestContext {
    pub service: TestService,
    pub oauth: Arc<MockOAuthHandler>,
    pub store: Arc<TestStore>,
    _temp_dir: TempDir,
}

pub fn create_test_context() -> TestContext {
    create_test_context_with_upstream_timeout(Duration::from_millis(200))
}

pub fn create_test_context_with_upstream_timeout(upstream_timeout: Duration) -> TestContext {
    let (storage, temp_dir) = RocksDbStorage::open_temp().unwrap();
    let store = Arc::new(StorageCredentialStore::new(Arc::new(storage)));
    let oauth = Arc::new(MockOAuthHandler::default());
    let service = RegistrationService::with_timeouts(
        Arc::clone(&oauth),
        Arc::clone(&store),
        upstream_timeout,
        Duration::from_secs(2),
    );

    TestContext {
        service,
        oauth,
        store,
        _temp_dir: temp_dir,
    }
}

pub fn create_unavailable_store_service(hang: bool) -> RegistrationService<MockOAuthHandler, UnavailableStore> {
    RegistrationService::with_timeouts(
        Arc::new(MockOAuthHandler::default()),
        Arc::new(UnavailableStore { hang }),
        Duration::from_millis(200),
        Duration::from_millis(50),
    )
}
