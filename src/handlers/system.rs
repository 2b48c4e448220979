// src/handlers/system.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::services::QuestionCatalog;

pub async fn health() -> impl IntoResponse {
    Json(json!({ "ok": true, "service": "admin-portal" }))
}

/// Reports whether question edits are currently locked.
pub async fn get_config(State(catalog): State<QuestionCatalog>) -> impl IntoResponse {
    Json(json!({ "ok": true, "examEditLock": catalog.edit_locked() }))
}

pub async fn api_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "ok": false, "error": "API route not found." })),
    )
}
