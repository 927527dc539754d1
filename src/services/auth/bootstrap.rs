use crate::repos::credentials::CredentialStore;
use crate::repos::error::RepoResult;
use crate::services::auth::policy::{ADMIN_ROLE, USER_ROLE};

pub const SEEDED_ROLES: [&str; 2] = [USER_ROLE, ADMIN_ROLE];

/// Create the built-in roles if they are missing. Safe to run on every start.
pub async fn ensure_roles(store: &dyn CredentialStore) -> RepoResult<()> {
    for role in SEEDED_ROLES {
        store.ensure_role(role).await?;
    }
    tracing::debug!(backend = store.backend_name(), "built-in roles present");
    Ok(())
}
