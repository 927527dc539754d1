/*
 * Responsibility
 * - POST /api/internal/Setup/Initialize
 * - 最初の Admin を一度だけ作成する (Admin が既にいれば 401)
 * - 同時実行されても Admin は一人 (store 側で判定と作成を一括で行う)
 */
use axum::{Json, extract::State};

use crate::api::dto::{auth::RegisterUserRequest, envelope::Envelope};
use crate::api::extractors::ValidJson;
use crate::api::handlers::auth::{ADMIN_EXISTS, Enrolment, create_account};
use crate::error::{AppError, AppResult};
use crate::services::auth::bootstrap::SEEDED_ROLES;
use crate::services::auth::policy::ADMIN_ROLE;
use crate::state::AppState;

pub async fn initialize(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RegisterUserRequest>,
) -> AppResult<Json<Envelope>> {
    let credentials = state.credentials.as_ref();

    // Fast path only; `create_sole_holder` makes the final decision.
    if credentials.role_exists(ADMIN_ROLE).await?
        && credentials.count_in_role(ADMIN_ROLE).await? > 0
    {
        tracing::warn!("initialize called with an existing admin");
        return Err(AppError::Unauthorized(vec![ADMIN_EXISTS.to_string()]));
    }

    for role in SEEDED_ROLES {
        if let Err(e) = credentials.ensure_role(role).await {
            tracing::error!(error = %e, role, "failed to create role");
            return Err(AppError::business(format!("Failed to create role: {role}")));
        }
    }

    let principal = create_account(&state, &req, Enrolment::FirstAdmin).await?;

    tracing::info!(user_id = %principal.id, "backend initialized");
    Ok(Json(Envelope::single("Initialized backend!")))
}
