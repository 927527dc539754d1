/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - gate middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - JWT の検証ロジックは middleware/services 側の責務
 */

use uuid::Uuid;

use crate::services::auth::access_jwt::VerifiedAccessToken;
use crate::services::auth::claims::ClaimSet;

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `user_id` は token の `nameid`
/// - `roles` は `role` claim の値 (policy 判定に使う)
/// - `claims` は token に埋め込まれた claim 全体
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub user_id: Uuid,
    pub email: String,
    pub user_name: String,
    pub roles: Vec<String>,
    pub jti: Option<String>,
    pub claims: ClaimSet,
}

impl From<VerifiedAccessToken> for AuthCtx {
    fn from(v: VerifiedAccessToken) -> Self {
        Self {
            user_id: v.user_id,
            email: v.email,
            user_name: v.user_name,
            roles: v.roles,
            jti: v.jti,
            claims: v.claims,
        }
    }
}
