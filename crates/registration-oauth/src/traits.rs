//! OAuth handler trait.

use crate::{
    errors::Result,
    types::{AccessToken, RequestToken},
};
use async_trait::async_trait;

/// The three legs of the OAuth 1.0a handshake for one fixed consumer
///
/// Implementations hold only immutable consumer configuration, so a single
/// instance can be shared across concurrent registrations.
#[async_trait]
pub trait OAuthHandler: Send + Sync {
    /// Obtain a fresh request token pair from the provider
    async fn get_request_token(&self) -> Result<RequestToken>;

    /// Build the URL the user visits to grant consent. No network call.
    fn authorization_url(&self, request_token: &RequestToken) -> Result<String>;

    /// Exchange a request token and the user's verifier for an access token
    async fn get_access_token(
        &self,
        request_token: &RequestToken,
        verifier: &str,
    ) -> Result<AccessToken>;
}
