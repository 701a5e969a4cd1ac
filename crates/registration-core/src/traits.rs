//! Registration trait definitions.

use crate::{errors::Result, types::RegistrationState};
use async_trait::async_trait;

/// Inbound registration operations exposed to the service boundary
#[async_trait]
pub trait Registration: Send + Sync {
    /// Start (or restart) registration for a screen name.
    ///
    /// Discards any earlier record for the screen name and returns the
    /// provider URL where the user obtains a verification token.
    async fn initiate_registration(&self, screen_name: &str) -> Result<String>;

    /// Complete registration by exchanging the user's verification token
    /// for an access token.
    async fn finalize_registration(&self, screen_name: &str, verification_token: &str)
        -> Result<()>;

    /// Current state of a screen name
    async fn registration_state(&self, screen_name: &str) -> Result<RegistrationState>;
}
