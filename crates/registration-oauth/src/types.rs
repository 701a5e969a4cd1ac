//! Token types returned by the handshake.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::errors::{OAuthError, Result};

/// Short-lived token pair issued before the user grants consent
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestToken {
    pub token: String,
    pub secret: String,
    /// Provider acknowledged the `oauth_callback` we sent
    pub callback_confirmed: bool,
}

impl RequestToken {
    /// Rebuild a request token from stored fields
    pub fn new(token: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            secret: secret.into(),
            callback_confirmed: true,
        }
    }

    /// Parse a form-encoded request-token response body
    pub fn from_response(body: &str) -> Result<Self> {
        let mut fields = parse_form(body);
        let (token, secret) = take_token_pair(&mut fields)?;
        let callback_confirmed = fields
            .get("oauth_callback_confirmed")
            .map(|v| v == "true")
            .unwrap_or(false);

        Ok(Self {
            token,
            secret,
            callback_confirmed,
        })
    }
}

impl fmt::Debug for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestToken")
            .field("token", &self.token)
            .field("secret", &"<redacted>")
            .field("callback_confirmed", &self.callback_confirmed)
            .finish()
    }
}

/// Long-lived token pair granted after the user's consent
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub token: String,
    pub secret: String,
    /// Stable provider user id, when the provider reports one
    pub user_id: Option<String>,
    /// Screen name the provider associates with the token
    pub screen_name: Option<String>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            secret: secret.into(),
            user_id: None,
            screen_name: None,
        }
    }

    /// Parse a form-encoded access-token response body
    pub fn from_response(body: &str) -> Result<Self> {
        let mut fields = parse_form(body);
        let (token, secret) = take_token_pair(&mut fields)?;

        Ok(Self {
            token,
            secret,
            user_id: fields.remove("user_id"),
            screen_name: fields.remove("screen_name"),
        })
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("secret", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("screen_name", &self.screen_name)
            .finish()
    }
}

fn parse_form(body: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(body.trim().as_bytes())
        .into_owned()
        .collect()
}

fn take_token_pair(fields: &mut HashMap<String, String>) -> Result<(String, String)> {
    let token = fields
        .remove("oauth_token")
        .filter(|t| !t.is_empty())
        .ok_or_else(|| OAuthError::InvalidResponse("missing oauth_token".to_string()))?;
    let secret = fields
        .remove("oauth_token_secret")
        .filter(|s| !s.is_empty())
        .ok_or_else(|| OAuthError::InvalidResponse("missing oauth_token_secret".to_string()))?;
    Ok((token, secret))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request_token_response() {
        let token = RequestToken::from_response(
            "oauth_token=Z6eEdO8MOmk394WozF5oKyuAv855l4Mlqo7hhlSLik&oauth_token_secret=Kd75W4OQfb2oJTV0vzGzeXftVAwgMnEK9MumzYcM&oauth_callback_confirmed=true",
        )
        .unwrap();

        assert_eq!(token.token, "Z6eEdO8MOmk394WozF5oKyuAv855l4Mlqo7hhlSLik");
        assert_eq!(token.secret, "Kd75W4OQfb2oJTV0vzGzeXftVAwgMnEK9MumzYcM");
        assert!(token.callback_confirmed);
    }

    #[test]
    fn test_parse_access_token_response() {
        let token = AccessToken::from_response(
            "oauth_token=6253282-eWudHldSbIaelX7swmsiHImEL4KinwaGloHANdrY&oauth_token_secret=2EEfA6BG3ly3sR3RjE0IBSnlQu4ZrUzPiYKmrkVU&user_id=6253282&screen_name=twitterapi\n",
        )
        .unwrap();

        assert_eq!(token.token, "6253282-eWudHldSbIaelX7swmsiHImEL4KinwaGloHANdrY");
        assert_eq!(token.user_id.as_deref(), Some("6253282"));
        assert_eq!(token.screen_name.as_deref(), Some("twitterapi"));
    }

    #[test]
    fn test_missing_secret_is_invalid_response() {
        let err = AccessToken::from_response("oauth_token=abc").unwrap_err();
        assert!(matches!(err, OAuthError::InvalidResponse(_)));

        let err = RequestToken::from_response("").unwrap_err();
        assert!(matches!(err, OAuthError::InvalidResponse(_)));
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let mut token = AccessToken::new("atk-value", "asec-value");
        token.user_id = Some("783214".to_string());
        let rendered = format!("{:?}", token);
        assert!(!rendered.contains("atk-value"));
        assert!(!rendered.contains("asec-value"));
        assert!(rendered.contains("783214"));

        let rendered = format!("{:?}", RequestToken::new("rtk-value", "rsec-value"));
        assert!(rendered.contains("rtk-value"));
        assert!(!rendered.contains("rsec-value"));
    }
}
