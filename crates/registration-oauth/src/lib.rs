//! # registration-oauth
//!
//! OAuth 1.0a (RFC 5849) consumer used to register users with a social-media
//! provider.
//!
//! The handshake has three legs:
//! - obtain a request token for the consumer ([`OAuthHandler::get_request_token`])
//! - send the user to the provider's authorization page
//!   ([`OAuthHandler::authorization_url`]), where they receive a verifier
//! - exchange request token and verifier for a long-lived access token
//!   ([`OAuthHandler::get_access_token`])
//!
//! Requests are signed with HMAC-SHA1 by the [`signature`] module.

#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod errors;
pub mod signature;
pub mod traits;
pub mod types;

pub use client::OAuthClient;
pub use config::OAuthConfig;
pub use errors::{OAuthError, Result};
pub use traits::OAuthHandler;
pub use types::{AccessToken, RequestToken};
