/*!
 * Caller identity, as left behind by the authentication gate
 *
 * Responsibility:
 * - gate が検証に成功した時だけ AuthCtx が request extensions に載る
 * - ここでは「載っているかどうか」だけを読み、401 / 403 は決めない
 *   (判定は Authorized<P> が policy を評価して行う)
 *
 * Public API:
 * - AuthCtx
 * - MaybeAuthCtx
 */

mod core;
mod types;

pub use core::MaybeAuthCtx;
pub use types::AuthCtx;
