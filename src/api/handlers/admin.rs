/*
 * Responsibility
 * - /api/Admin/{AssignRole,AssignClaim} handler (AdminPolicy)
 * - 既存 principal への role / claim 付与
 */
use axum::{Json, extract::State};

use crate::api::dto::admin::{AssignClaimRequest, AssignRoleRequest};
use crate::api::dto::envelope::Envelope;
use crate::api::extractors::{AdminAuth, ValidJson};
use crate::api::handlers::auth::USER_NOT_FOUND;
use crate::error::{AppError, AppResult};
use crate::repos::credentials::Principal;
use crate::services::auth::claims::Claim;
use crate::state::AppState;

async fn principal_by_email(state: &AppState, email: &str) -> AppResult<Principal> {
    state
        .credentials
        .find_by_email(email)
        .await?
        .ok_or_else(|| AppError::not_found(USER_NOT_FOUND))
}

pub async fn assign_role(
    State(state): State<AppState>,
    auth: AdminAuth,
    ValidJson(req): ValidJson<AssignRoleRequest>,
) -> AppResult<Json<Envelope>> {
    let email = req.email.as_deref().unwrap_or_default();
    let role = req.role.as_deref().unwrap_or_default();

    let principal = principal_by_email(&state, email).await?;
    state.credentials.add_role(&principal, role).await?;

    tracing::info!(by = %auth.ctx.user_id, user_id = %principal.id, role, "role assigned");
    Ok(Json(Envelope::single(format!(
        "Assigned role {role} to {email}"
    ))))
}

pub async fn assign_claim(
    State(state): State<AppState>,
    auth: AdminAuth,
    ValidJson(req): ValidJson<AssignClaimRequest>,
) -> AppResult<Json<Envelope>> {
    let email = req.email.as_deref().unwrap_or_default();
    let claim = Claim::new(
        req.r#type.as_deref().unwrap_or_default(),
        req.value.as_deref().unwrap_or_default(),
    );

    let principal = principal_by_email(&state, email).await?;
    state.credentials.add_claim(&principal, &claim).await?;

    tracing::info!(
        by = %auth.ctx.user_id,
        user_id = %principal.id,
        claim_type = %claim.claim_type,
        "claim assigned"
    );
    Ok(Json(Envelope::single(format!(
        "Assigned claim {}={} to {email}",
        claim.claim_type, claim.value
    ))))
}
