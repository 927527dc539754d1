//! Authentication gate: bearer token 検証 → AuthCtx を extensions に入れる
//!
//! - `Authorization: Bearer <jwt>` を検証し、成功時のみ `AuthCtx` を格納する
//! - 失敗してもリクエストは拒否しない (匿名として続行し、debug log のみ)
//! - 401 / 403 の判定は `Authorized<P>` extractor (policy) 側の責務

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::extractors::AuthCtx;
use crate::state::AppState;

/// Apply the gate to every route of `router`.
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

/// `Bearer` scheme is matched case-insensitively.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(req.headers()) {
        match state.tokens.verify(token) {
            Ok(verified) => {
                req.extensions_mut().insert(AuthCtx::from(verified));
            }
            Err(err) => {
                tracing::debug!(error = %err, "access token rejected");
            }
        }
    }

    next.run(req).await
}
