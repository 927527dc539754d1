/*
 * Responsibility
 * - GET /health (疎通用, 認証なし)
 */
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "credentials": state.credentials.backend_name(),
            "stories": state.stories.backend_name(),
            "blobs": state.blobs.backend_name(),
        })),
    )
}
