/*
 * Responsibility
 *  - policy ごとの tag 型と extractor alias を宣言する
 *  - policy が増えたらここに追加する
 */
use super::core::{Authorized, PolicyTag};
use crate::services::auth::policy::{ADMIN_POLICY, Policy, USER_POLICY};

// UserPolicy: User or Admin
pub enum UserPolicyTag {}
impl PolicyTag for UserPolicyTag {
    const POLICY: Policy = USER_POLICY;
}
pub type UserAuth = Authorized<UserPolicyTag>;

// AdminPolicy: Admin
pub enum AdminPolicyTag {}
impl PolicyTag for AdminPolicyTag {
    const POLICY: Policy = ADMIN_POLICY;
}
pub type AdminAuth = Authorized<AdminPolicyTag>;
