// src/handlers/questions.rs

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::{error::AppError, models::question::QuestionDraft, services::QuestionCatalog};

/// Active questions, numbered 1..N by creation order.
pub async fn list_questions(
    State(catalog): State<QuestionCatalog>,
) -> Result<impl IntoResponse, AppError> {
    let questions = catalog.list().await?;

    Ok(Json(json!({
        "ok": true,
        "total": questions.len(),
        "questions": questions,
    })))
}

pub async fn exam_summary(
    State(catalog): State<QuestionCatalog>,
) -> Result<impl IntoResponse, AppError> {
    let total_active_questions = catalog.active_count().await?;

    Ok(Json(json!({
        "ok": true,
        "totalActiveQuestions": total_active_questions,
    })))
}

/// Creates a question. Rejected with 423 while the edit lock is on.
pub async fn create_question(
    State(catalog): State<QuestionCatalog>,
    payload: Result<Json<QuestionDraft>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    // The lock answers before the body is looked at.
    catalog.ensure_unlocked()?;
    let Json(draft) = payload?;
    let created = catalog.create(&draft).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "ok": true,
            "questionId": created.internal_id,
            "question": created,
        })),
    ))
}

/// Replaces a question's text, image and options, keeping its business id.
pub async fn update_question(
    State(catalog): State<QuestionCatalog>,
    Path(id): Path<String>,
    payload: Result<Json<QuestionDraft>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    catalog.ensure_unlocked()?;
    let Json(draft) = payload?;
    let updated = catalog.update(&id, &draft).await?;

    Ok(Json(json!({
        "ok": true,
        "question": updated,
    })))
}

/// Soft-deletes a question. `id` may be the storage key or the business key.
pub async fn delete_question(
    State(catalog): State<QuestionCatalog>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let internal_id = catalog.soft_delete(&id).await?;

    Ok(Json(json!({
        "ok": true,
        "questionId": internal_id,
    })))
}
