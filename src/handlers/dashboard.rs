// src/handlers/dashboard.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde_json::json;

use crate::{error::AppError, models::attempt::SearchParams, state::AppState};

/// Latest attempt per candidate together with the ranked leaderboard.
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let payload = state
        .dashboard
        .get(state.source.as_ref(), params.search.as_deref())
        .await?;

    Ok(Json(json!({
        "ok": true,
        "results": payload.results,
        "leaderboard": payload.leaderboard,
    })))
}

/// Latest attempt per candidate, newest submission first.
pub async fn get_results(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let payload = state
        .dashboard
        .get(state.source.as_ref(), params.search.as_deref())
        .await?;

    Ok(Json(json!({
        "ok": true,
        "count": payload.results.len(),
        "results": payload.results,
    })))
}

/// The densely ranked leaderboard.
pub async fn get_scorecard(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let payload = state
        .dashboard
        .get(state.source.as_ref(), params.search.as_deref())
        .await?;

    Ok(Json(json!({
        "ok": true,
        "count": payload.leaderboard.len(),
        "scorecard": payload.leaderboard,
    })))
}
