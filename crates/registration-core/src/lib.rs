//! # registration-core
//!
//! Registration subsystem for the OAuth registration service.
//!
//! Responsible for:
//! - The per-screen-name credential lifecycle (absent → pending → verified)
//! - Persisting [`UserCredential`] records through a [`CredentialStore`]
//! - Driving the OAuth handshake through an [`OAuthHandler`]
//!
//! [`OAuthHandler`]: registration_oauth::OAuthHandler

#![warn(clippy::all)]

pub mod errors;
mod service;
pub mod store;
pub mod traits;
pub mod types;


pub use errors::{RegistrationError, Result};
pub use service::RegistrationService;
pub use store::{CredentialStore, StorageCredentialStore};
pub use traits::Registration;
pub use types::*;
