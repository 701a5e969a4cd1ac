//! HTTP OAuth 1.0a client.

use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, Client};
use tracing::{debug, warn};
use url::Url;

use crate::config::OAuthConfig;
use crate::errors::{OAuthError, Result};
use crate::signature::SignedRequest;
use crate::traits::OAuthHandler;
use crate::types::{AccessToken, RequestToken};

/// OAuth client bound to one consumer key/secret pair
pub struct OAuthClient {
    http_client: Client,
    config: OAuthConfig,
}

impl OAuthClient {
    /// Create a new OAuth client
    pub fn new(config: OAuthConfig) -> Result<Self> {
        if config.consumer_key.is_empty() || config.consumer_secret.is_empty() {
            return Err(OAuthError::ConfigInvalid(
                "Consumer key and secret are required".to_string(),
            ));
        }
        Url::parse(&config.authorize_url).map_err(|e| {
            OAuthError::ConfigInvalid(format!("Invalid authorize URL: {}", e))
        })?;

        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| OAuthError::ConfigInvalid(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Send a signed, body-less POST and return the response body
    async fn signed_post(&self, url: &str, request: SignedRequest<'_>) -> Result<String> {
        let authorization = request.authorization()?;

        let response = self
            .http_client
            .post(url)
            .header(AUTHORIZATION, authorization)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), url, "OAuth provider rejected request");
            return Err(OAuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }

    fn classify(&self, error: reqwest::Error) -> OAuthError {
        if error.is_timeout() {
            OAuthError::Timeout(self.config.timeout)
        } else {
            OAuthError::Transport(error.to_string())
        }
    }
}

#[async_trait]
impl OAuthHandler for OAuthClient {
    async fn get_request_token(&self) -> Result<RequestToken> {
        let request = SignedRequest {
            method: "POST",
            url: &self.config.request_token_url,
            consumer_key: &self.config.consumer_key,
            consumer_secret: &self.config.consumer_secret,
            token: None,
            token_secret: None,
            extra_oauth_params: vec![("oauth_callback".to_string(), self.config.callback.clone())],
            request_params: vec![],
        };

        let body = self.signed_post(&self.config.request_token_url, request).await?;
        let token = RequestToken::from_response(&body)?;

        if !token.callback_confirmed {
            warn!("Provider did not confirm oauth_callback");
        }
        debug!("Obtained request token");

        Ok(token)
    }

    fn authorization_url(&self, request_token: &RequestToken) -> Result<String> {
        build_authorization_url(&self.config.authorize_url, request_token)
    }

    async fn get_access_token(
        &self,
        request_token: &RequestToken,
        verifier: &str,
    ) -> Result<AccessToken> {
        if verifier.trim().is_empty() {
            return Err(OAuthError::InvalidInput("Verifier is empty".to_string()));
        }

        let request = SignedRequest {
            method: "POST",
            url: &self.config.access_token_url,
            consumer_key: &self.config.consumer_key,
            consumer_secret: &self.config.consumer_secret,
            token: Some(&request_token.token),
            token_secret: Some(&request_token.secret),
            extra_oauth_params: vec![("oauth_verifier".to_string(), verifier.trim().to_string())],
            request_params: vec![],
        };

        let body = self.signed_post(&self.config.access_token_url, request).await?;
        let token = AccessToken::from_response(&body)?;
        debug!(user_id = ?token.user_id, "Obtained access token");

        Ok(token)
    }
}

/// `authorize_url?oauth_token=<request token>`
pub fn build_authorization_url(authorize_url: &str, request_token: &RequestToken) -> Result<String> {
    if request_token.token.is_empty() {
        return Err(OAuthError::InvalidInput("Request token is empty".to_string()));
    }

    let mut url = Url::parse(authorize_url)
        .map_err(|e| OAuthError::ConfigInvalid(format!("Invalid authorize URL: {}", e)))?;
    url.query_pairs_mut()
        .append_pair("oauth_token", &request_token.token);

    Ok(url.to_string())
}
