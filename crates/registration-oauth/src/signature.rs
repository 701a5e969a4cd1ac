//! OAuth 1.0a request signing (RFC 5849 section 3.4, HMAC-SHA1).

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use rand::{distributions::Alphanumeric, Rng};
use sha1::Sha1;
use std::time::{SystemTime, UNIX_EPOCH};
use url::Url;

use crate::errors::{OAuthError, Result};

pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";
pub const OAUTH_VERSION: &str = "1.0";

/// RFC 3986 percent-encoding: everything except `A-Z a-z 0-9 - . _ ~`
pub fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Random alphanumeric nonce
pub fn generate_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Current unix time in seconds
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Base string URI: scheme, lowercase host, non-default port and path, no query.
pub fn normalize_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url)
        .map_err(|e| OAuthError::ConfigInvalid(format!("Invalid endpoint URL {}: {}", url, e)))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| OAuthError::ConfigInvalid(format!("Endpoint URL has no host: {}", url)))?;

    let mut normalized = format!("{}://{}", parsed.scheme(), host.to_lowercase());
    if let Some(port) = parsed.port() {
        normalized.push_str(&format!(":{}", port));
    }
    normalized.push_str(parsed.path());
    Ok(normalized)
}

/// Build the signature base string from the request method, endpoint and
/// every protocol and request parameter (excluding `oauth_signature`).
pub fn signature_base_string(method: &str, url: &str, params: &[(String, String)]) -> Result<String> {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();

    let parameter_string = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    Ok(format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(&normalize_url(url)?),
        percent_encode(&parameter_string)
    ))
}

/// HMAC-SHA1 over the base string, keyed by `consumer_secret&token_secret`
pub fn sign_hmac_sha1(base_string: &str, consumer_secret: &str, token_secret: Option<&str>) -> Result<String> {
    let key = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret.unwrap_or(""))
    );

    let mut mac = Hmac::<Sha1>::new_from_slice(key.as_bytes())
        .map_err(|e| OAuthError::Signing(e.to_string()))?;
    mac.update(base_string.as_bytes());

    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Render protocol parameters as an `Authorization: OAuth ...` header value
pub fn authorization_header(oauth_params: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = oauth_params.iter().collect();
    sorted.sort();

    let fields = sorted
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join(", ");

    format!("OAuth {}", fields)
}

/// One signed provider request
pub struct SignedRequest<'a> {
    pub method: &'a str,
    pub url: &'a str,
    pub consumer_key: &'a str,
    pub consumer_secret: &'a str,
    pub token: Option<&'a str>,
    pub token_secret: Option<&'a str>,
    /// Additional `oauth_*` protocol parameters (callback, verifier)
    pub extra_oauth_params: Vec<(String, String)>,
    /// Query or form body parameters covered by the signature
    pub request_params: Vec<(String, String)>,
}

impl SignedRequest<'_> {
    /// Sign with a fresh nonce and the current time
    pub fn authorization(&self) -> Result<String> {
        self.authorization_with(&generate_nonce(), current_timestamp())
    }

    /// Sign with a fixed nonce and timestamp
    pub fn authorization_with(&self, nonce: &str, timestamp: u64) -> Result<String> {
        let mut oauth_params = vec![
            ("oauth_consumer_key".to_string(), self.consumer_key.to_string()),
            ("oauth_nonce".to_string(), nonce.to_string()),
            ("oauth_signature_method".to_string(), SIGNATURE_METHOD.to_string()),
            ("oauth_timestamp".to_string(), timestamp.to_string()),
            ("oauth_version".to_string(), OAUTH_VERSION.to_string()),
        ];
        if let Some(token) = self.token {
            oauth_params.push(("oauth_token".to_string(), token.to_string()));
        }
        oauth_params.extend(self.extra_oauth_params.iter().cloned());

        let mut all_params = oauth_params.clone();
        all_params.extend(self.request_params.iter().cloned());

        let base_string = signature_base_string(self.method, self.url, &all_params)?;
        let signature = sign_hmac_sha1(&base_string, self.consumer_secret, self.token_secret)?;
        oauth_params.push(("oauth_signature".to_string(), signature));

        Ok(authorization_header(&oauth_params))
    }
}
