//! OAuth handshake errors.

use std::time::Duration;
use thiserror::Error;

/// Errors raised while talking to the OAuth provider
#[derive(Debug, Error)]
pub enum OAuthError {
    /// Consumer configuration cannot be used (bad endpoint URL, empty key)
    #[error("Invalid OAuth configuration: {0}")]
    ConfigInvalid(String),

    /// Caller supplied malformed input (empty token or verifier)
    #[error("Invalid OAuth input: {0}")]
    InvalidInput(String),

    /// Provider answered with a non-success status
    #[error("Provider rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Provider could not be reached
    #[error("Provider request failed: {0}")]
    Transport(String),

    /// Provider did not answer within the configured deadline
    #[error("Provider request timed out after {0:?}")]
    Timeout(Duration),

    /// Provider answered 2xx but the body was not a usable token response
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    /// Request signing failed
    #[error("Signing error: {0}")]
    Signing(String),
}

impl OAuthError {
    /// Whether the provider itself refused the credentials or verifier
    pub fn is_rejection(&self) -> bool {
        matches!(self, OAuthError::Rejected { .. })
    }
}

/// Result type for OAuth operations
pub type Result<T> = std::result::Result<T, OAuthError>;
