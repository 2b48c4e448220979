// src/models/auth.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// DTO for admin login. Missing fields read as empty and simply fail the check.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(max = 128))]
    pub username: String,
    #[serde(default)]
    #[validate(length(max = 256))]
    pub password: String,
}

/// Returned on a successful login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub ok: bool,
    pub token: String,
    /// Expiry as milliseconds since the Unix epoch.
    pub expires_at: i64,
}
