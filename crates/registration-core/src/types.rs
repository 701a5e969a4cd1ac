//! Registration data types.

use registration_oauth::{AccessToken, RequestToken};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stored OAuth credentials for one screen name
///
/// A record is created pending (request token only) and becomes verified
/// once the access token fields are populated.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCredential {
    /// Storage identity; the store key is `(screen_name, record_id)`
    pub record_id: Uuid,
    /// Provider screen name. Reassignable by the provider, so not a stable identity.
    pub screen_name: String,
    pub request_token: String,
    pub request_secret: String,
    pub access_token: Option<String>,
    pub access_secret: Option<String>,
    /// Provider user id reported with the access token
    pub provider_user_id: Option<String>,
    pub created_at: u64,
    pub verified_at: Option<u64>,
}

impl UserCredential {
    /// New pending record holding a fresh request token
    pub fn pending(screen_name: impl Into<String>, request_token: &RequestToken) -> Self {
        Self {
            record_id: Uuid::new_v4(),
            screen_name: screen_name.into(),
            request_token: request_token.token.clone(),
            request_secret: request_token.secret.clone(),
            access_token: None,
            access_secret: None,
            provider_user_id: None,
            created_at: current_timestamp(),
            verified_at: None,
        }
    }

    /// The stored request token, rebuilt for the access-token exchange
    pub fn request_token_pair(&self) -> RequestToken {
        RequestToken::new(self.request_token.clone(), self.request_secret.clone())
    }

    /// Copy of this record with the access token applied
    pub fn verified(&self, access_token: AccessToken) -> Self {
        Self {
            access_token: Some(access_token.token),
            access_secret: Some(access_token.secret),
            provider_user_id: access_token.user_id.or_else(|| self.provider_user_id.clone()),
            verified_at: Some(current_timestamp()),
            ..self.clone()
        }
    }

    pub fn state(&self) -> RegistrationState {
        match (&self.access_token, &self.access_secret) {
            (Some(token), Some(secret)) if !token.is_empty() && !secret.is_empty() => {
                RegistrationState::Verified
            }
            _ => RegistrationState::Pending,
        }
    }

    /// Store key for this record
    pub fn storage_key(&self) -> (String, Uuid) {
        (self.screen_name.clone(), self.record_id)
    }
}

impl fmt::Debug for UserCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserCredential")
            .field("record_id", &self.record_id)
            .field("screen_name", &self.screen_name)
            .field("request_token", &token_fingerprint(&self.request_token))
            .field("access_token", &self.access_token.as_deref().map(token_fingerprint))
            .field("provider_user_id", &self.provider_user_id)
            .field("created_at", &self.created_at)
            .field("verified_at", &self.verified_at)
            .finish_non_exhaustive()
    }
}

/// Registration state of one screen name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationState {
    /// No stored record
    Absent,
    /// Request token stored, waiting for the verifier
    Pending,
    /// Access token stored
    Verified,
}

/// Short, non-reversible token identifier for logs
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    hex::encode(&digest[..6])
}

pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
