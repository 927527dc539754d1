/*
 * Responsibility
 * - handler 引数として使う extractor の公開
 * - 引数の順序: 認証 (AuthCtx / Authorized) → query → body
 */
pub mod auth_ctx;
pub mod authorized;
pub mod validated;

pub use auth_ctx::{AuthCtx, MaybeAuthCtx};
pub use authorized::{AdminAuth, Authorized, UserAuth};
pub use validated::{ValidJson, ValidQuery};
