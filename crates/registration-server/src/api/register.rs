use axum::{
    extract::{OriginalUri, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use registration_core::RegistrationState;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct ScreenNameQuery {
    pub screenname: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetTokenQuery {
    pub screenname: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegistrationStatusResponse {
    pub screen_name: String,
    pub state: RegistrationState,
}

fn required_param(value: Option<String>, name: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::InvalidRequest(format!("{} is required", name))),
    }
}

/// Start a registration and return the provider authorization URL as plain text
pub async fn initiate_registration(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ScreenNameQuery>,
) -> Result<String, ApiError> {
    let screen_name = required_param(query.screenname, "screenname")?;

    let url = state.registration.initiate_registration(&screen_name).await?;

    Ok(url)
}

/// Complete a registration with the verifier the user got from the provider
pub async fn finalize_registration(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<SetTokenQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let screen_name = required_param(query.screenname, "screenname")?;
    let token = required_param(query.token, "token")?;

    state
        .registration
        .finalize_registration(&screen_name, &token)
        .await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, uri.path().to_string())],
    ))
}

/// Report where a screen name is in the registration lifecycle
pub async fn registration_status(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ScreenNameQuery>,
) -> Result<Json<RegistrationStatusResponse>, ApiError> {
    let screen_name = required_param(query.screenname, "screenname")?;

    let registration_state = state.registration.registration_state(&screen_name).await?;

    Ok(Json(RegistrationStatusResponse {
        screen_name: screen_name.trim().to_string(),
        state: registration_state,
    }))
}
