/*
 * Responsibility
 * - GET /health (gateway / LB からの疎通確認)
 * - 現在の validation mode だけを返す (credential の件数や値は出さない)
 */
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let mode = state.authorizer.mode().as_str();
    (StatusCode::OK, Json(json!({"status": "ok", "validation": mode})))
}
