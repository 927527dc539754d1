use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::state::AppState;

use super::AuthCtx;

/// The caller's `AuthCtx`, or `None` for an anonymous request.
///
/// No token, a bad token and an expired token all look the same here.
/// Never rejects; `Authorized<P>` turns `None` into 401 when its policy needs a caller.
#[derive(Debug, Clone)]
pub struct MaybeAuthCtx(pub Option<AuthCtx>);

impl FromRequestParts<AppState> for MaybeAuthCtx
where
    AppState: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthCtx(parts.extensions.get::<AuthCtx>().cloned()))
    }
}
