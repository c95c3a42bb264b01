/*
 * Responsibility
 * - POST /authorize (gateway の authorizer callback)
 * - body はそのまま Authorizer の fail-closed 境界に渡す
 * - 形の壊れた body も 4xx にせず deny の Decision を返す
 */
use axum::{Json, body::Bytes, extract::State};

use crate::services::authz::Decision;
use crate::state::AppState;

pub async fn authorize(State(state): State<AppState>, body: Bytes) -> Json<Decision> {
    Json(state.authorizer.authorize_raw(&body))
}
