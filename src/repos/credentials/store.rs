use std::fmt;

use async_trait::async_trait;
use uuid::Uuid;

use crate::repos::error::RepoResult;
use crate::services::auth::claims::Claim;

/// A registered user as the credential store sees it.
#[derive(Clone)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
    pub user_name: String,
    pub phone_number: Option<String>,
    pub password_hash: String,
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the password hash
        f.debug_struct("Principal")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("user_name", &self.user_name)
            .finish()
    }
}

/// Input for `create_principal`. The store hashes the password.
#[derive(Debug, Clone, Copy)]
pub struct NewPrincipal<'a> {
    pub user_name: &'a str,
    pub email: &'a str,
    pub phone_number: Option<&'a str>,
    pub password: &'a str,
}

/// Identity storage: principals, roles and the claims attached to both.
///
/// Implementations own uniqueness of e-mail (case-insensitive) and username and
/// report violations as `RepoError::Conflict` / `RepoError::DuplicateUserName`.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    // Returns the store backend name (for logging).
    fn backend_name(&self) -> &'static str;

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<Principal>>;

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Principal>>;

    async fn verify_secret(&self, principal: &Principal, secret: &str) -> RepoResult<bool>;

    /// Role names held by the principal, in store order.
    async fn roles(&self, principal: &Principal) -> RepoResult<Vec<String>>;

    /// Claims assigned directly to the principal.
    async fn claims(&self, principal: &Principal) -> RepoResult<Vec<Claim>>;

    /// Claims attached to a role. `None` when the role does not exist.
    async fn role_claims(&self, role: &str) -> RepoResult<Option<Vec<Claim>>>;

    /// Creates the principal already holding `roles`, in one step.
    ///
    /// Nothing is stored when any role is missing (`RepoError::RoleNotFound`).
    async fn create_principal(
        &self,
        new: NewPrincipal<'_>,
        roles: &[&str],
    ) -> RepoResult<Principal>;

    /// `create_principal`, but only while nobody holds `exclusive`.
    ///
    /// The holder check and the insert are atomic; a held role yields
    /// `RepoError::RoleTaken` and stores nothing.
    async fn create_sole_holder(
        &self,
        new: NewPrincipal<'_>,
        exclusive: &str,
        roles: &[&str],
    ) -> RepoResult<Principal>;

    /// Grants a role. Granting a held role again is a no-op.
    async fn add_role(&self, principal: &Principal, role: &str) -> RepoResult<()>;

    async fn add_claim(&self, principal: &Principal, claim: &Claim) -> RepoResult<()>;

    /// Creates the role when absent.
    async fn ensure_role(&self, role: &str) -> RepoResult<()>;

    async fn role_exists(&self, role: &str) -> RepoResult<bool>;

    async fn count_in_role(&self, role: &str) -> RepoResult<u64>;
}
