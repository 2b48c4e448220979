// src/handlers/auth.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::auth::{LoginRequest, LoginResponse},
    state::AppState,
    utils::{auth::AdminIdentity, session::SessionStore},
};

/// Authenticates the admin and opens a session.
///
/// Wrong username, wrong password and oversized input all produce the same 401.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.validate().is_err() {
        return Err(AppError::invalid_credentials());
    }

    if !state.credentials.verify(&payload.username, &payload.password)? {
        tracing::warn!("Rejected admin login attempt");
        return Err(AppError::invalid_credentials());
    }

    let session = state.sessions.issue(&state.credentials.username);
    tracing::info!(user = %session.identity, "Admin logged in");

    Ok(Json(LoginResponse {
        ok: true,
        token: session.token,
        expires_at: session.expires_at.timestamp_millis(),
    }))
}

/// Ends the session the request was authenticated with.
pub async fn logout(
    State(sessions): State<SessionStore>,
    Extension(identity): Extension<AdminIdentity>,
) -> Result<impl IntoResponse, AppError> {
    sessions.revoke(&identity.token);
    tracing::info!(user = %identity.username, "Admin logged out");

    Ok(Json(json!({ "ok": true })))
}
