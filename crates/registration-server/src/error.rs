use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use registration_core::RegistrationError;
use registration_oauth::OAuthError;
use serde::Serialize;

/// API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Provider refused the consumer credentials or the verifier
    #[error("Upstream authorization rejected: {0}")]
    UpstreamRejected(String),

    /// Provider unreachable, timed out or answered garbage
    #[error("Upstream authorization failed: {0}")]
    UpstreamFailed(String),

    #[error("Credential store unavailable: {0}")]
    StoreUnavailable(String),

    #[allow(dead_code)]
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            ApiError::InvalidRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "INVALID_REQUEST",
                msg,
                None,
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
            ApiError::UpstreamRejected(msg) => (
                StatusCode::UNAUTHORIZED,
                "UPSTREAM_AUTH_REJECTED",
                "The authorization provider rejected the request".to_string(),
                Some(serde_json::json!({ "reason": msg })),
            ),
            ApiError::UpstreamFailed(msg) => {
                tracing::warn!(error = %msg, "Upstream authorization failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_AUTH_FAILED",
                    "The authorization provider could not complete the request".to_string(),
                    None,
                )
            }
            ApiError::StoreUnavailable(msg) => {
                tracing::error!(error = %msg, "Credential store unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORE_UNAVAILABLE",
                    "Credential store is unavailable".to_string(),
                    None,
                )
            }
            ApiError::Internal(err) => {
                tracing::error!("Internal error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: ErrorDetails {
                code: code.to_string(),
                message,
                details,
            },
        });

        (status, body).into_response()
    }
}

impl From<RegistrationError> for ApiError {
    fn from(error: RegistrationError) -> Self {
        match error {
            RegistrationError::InvalidScreenName(_) => {
                ApiError::InvalidRequest("screenname must not be blank".to_string())
            }
            RegistrationError::NotFound(name) => {
                ApiError::NotFound(format!("No registration in progress for {}", name))
            }
            RegistrationError::UpstreamAuth(OAuthError::InvalidInput(msg)) => {
                ApiError::InvalidRequest(msg)
            }
            RegistrationError::UpstreamAuth(e) if e.is_rejection() => {
                ApiError::UpstreamRejected(e.to_string())
            }
            RegistrationError::UpstreamAuth(e) => ApiError::UpstreamFailed(e.to_string()),
            RegistrationError::StoreUnavailable(e) => ApiError::StoreUnavailable(e.to_string()),
        }
    }
}
