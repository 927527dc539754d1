/*
 * Responsibility
 * - request extensions の AuthCtx を named policy で判定し、handler に渡す
 * - 判定結果を 401 (identity なし) / 403 (role 不足) へ変換
 * 置くもの
 *  - Authorized<P> 本体と FromRequestParts 実装
 *  - PolicyTag trait
 * 置かないもの
 *  - 具体的な policy tag / alias (types.rs)
 *  - role 判定ロジック (services::auth::policy)
 */
use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::api::extractors::auth_ctx::{AuthCtx, MaybeAuthCtx};
use crate::error::AppError;
use crate::services::auth::policy::{Decision, Policy};
use crate::state::AppState;

/// Binds a type to a named policy.
pub trait PolicyTag {
    const POLICY: Policy;
}

/// Caller identity that satisfied policy `P`.
pub struct Authorized<P> {
    pub ctx: AuthCtx,
    _policy: PhantomData<P>,
}

impl<P> Authorized<P> {
    fn new(ctx: AuthCtx) -> Self {
        Self {
            ctx,
            _policy: PhantomData,
        }
    }
}

impl<P> FromRequestParts<AppState> for Authorized<P>
where
    P: PolicyTag + Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Ok(MaybeAuthCtx(ctx)) = MaybeAuthCtx::from_request_parts(parts, state).await;

        match P::POLICY.evaluate(ctx.as_ref().map(|c| c.roles.as_slice())) {
            Decision::Allow => ctx.map(Self::new).ok_or_else(AppError::unauthorized),
            Decision::Unauthenticated => Err(AppError::unauthorized()),
            Decision::Forbidden => {
                tracing::debug!(
                    policy = P::POLICY.name,
                    user_id = ?ctx.as_ref().map(|c| c.user_id),
                    "policy denied"
                );
                Err(AppError::Forbidden)
            }
        }
    }
}

impl<P> std::fmt::Debug for Authorized<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authorized")
            .field("ctx", &self.ctx)
            .finish()
    }
}
