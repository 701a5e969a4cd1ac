use axum::{extract::State, response::Json};
use registration_storage::{Storage, StorageError};
use serde::Serialize;
use std::sync::Arc;

use crate::{error::ApiError, state::AppState};

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    status: &'static str,
    database: &'static str,
}

/// Readiness check endpoint; pings the credential store
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReadinessResponse>, ApiError> {
    let timeout = state.config.store_timeout;
    match tokio::time::timeout(timeout, state.storage.ping()).await {
        Ok(Ok(())) => Ok(Json(ReadinessResponse {
            status: "ready",
            database: "connected",
        })),
        Ok(Err(e)) => Err(ApiError::StoreUnavailable(e.to_string())),
        Err(_) => Err(ApiError::StoreUnavailable(
            StorageError::Timeout(timeout).to_string(),
        )),
    }
}
