/*
 * Responsibility
 * - POST /api/User/FetchUser (UserPolicy)
 */
use axum::{Json, extract::State};

use crate::api::dto::users::{FetchUserRequest, UserDto};
use crate::api::extractors::{UserAuth, ValidJson};
use crate::api::handlers::auth::USER_NOT_FOUND;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub async fn fetch_user(
    State(state): State<AppState>,
    _auth: UserAuth,
    ValidJson(req): ValidJson<FetchUserRequest>,
) -> AppResult<Json<UserDto>> {
    let email = req.email.as_deref().unwrap_or_default();

    let principal = state
        .credentials
        .find_by_email(email)
        .await?
        .ok_or_else(|| {
            tracing::debug!(email = %email, "fetch for unknown e-mail");
            AppError::not_found(USER_NOT_FOUND)
        })?;

    Ok(Json(principal.into()))
}
