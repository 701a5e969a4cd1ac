//! Registration error types.

use registration_oauth::OAuthError;
use registration_storage::StorageError;
use thiserror::Error;

/// Registration errors
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// Screen name missing or blank
    #[error("Invalid screen name: {0:?}")]
    InvalidScreenName(String),

    /// No pending registration exists for the screen name
    #[error("No registration found for screen name: {0}")]
    NotFound(String),

    /// The OAuth provider rejected or could not complete a handshake step
    #[error("Upstream authorization failed: {0}")]
    UpstreamAuth(#[from] OAuthError),

    /// The credential store could not be reached or failed an operation
    #[error("Credential store unavailable: {0}")]
    StoreUnavailable(#[from] StorageError),
}

impl RegistrationError {
    /// Errors caused by the caller's input rather than a server-side fault
    pub fn is_client_error(&self) -> bool {
        match self {
            RegistrationError::InvalidScreenName(_) | RegistrationError::NotFound(_) => true,
            RegistrationError::UpstreamAuth(e) => {
                e.is_rejection() || matches!(e, OAuthError::InvalidInput(_))
            }
            RegistrationError::StoreUnavailable(_) => false,
        }
    }
}

/// Result type for registration operations
pub type Result<T> = std::result::Result<T, RegistrationError>;
