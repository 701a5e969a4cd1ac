//! OAuth consumer configuration.

use std::time::Duration;

/// Out-of-band callback: the provider shows the verifier to the user instead
/// of redirecting.
pub const OOB_CALLBACK: &str = "oob";

/// Default deadline for a single provider round trip
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// OAuth 1.0a consumer configuration
#[derive(Clone)]
pub struct OAuthConfig {
    /// Consumer key issued by the provider
    pub consumer_key: String,
    /// Consumer secret issued by the provider
    pub consumer_secret: String,
    /// Request-token endpoint
    pub request_token_url: String,
    /// User authorization page
    pub authorize_url: String,
    /// Access-token endpoint
    pub access_token_url: String,
    /// `oauth_callback` sent with the request-token call
    pub callback: String,
    /// Per-request timeout for provider calls
    pub timeout: Duration,
}

impl OAuthConfig {
    /// Create X (Twitter) OAuth 1.0a configuration
    pub fn twitter(consumer_key: String, consumer_secret: String) -> Self {
        Self {
            consumer_key,
            consumer_secret,
            request_token_url: "https://api.twitter.com/oauth/request_token".to_string(),
            authorize_url: "https://api.twitter.com/oauth/authorize".to_string(),
            access_token_url: "https://api.twitter.com/oauth/access_token".to_string(),
            callback: OOB_CALLBACK.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_callback(mut self, callback: impl Into<String>) -> Self {
        self.callback = callback.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("request_token_url", &self.request_token_url)
            .field("authorize_url", &self.authorize_url)
            .field("access_token_url", &self.access_token_url)
            .field("callback", &self.callback)
            .field("timeout", &self.timeout)
            .finish()
    }
}
