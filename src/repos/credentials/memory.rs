use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::repos::credentials::store::{CredentialStore, NewPrincipal, Principal};
use crate::repos::error::{RepoError, RepoResult};
use crate::services::auth::claims::Claim;
use crate::services::auth::password;

#[derive(Default)]
struct Inner {
    principals: Vec<Principal>,
    // principal id -> role names, in grant order
    principal_roles: HashMap<Uuid, Vec<String>>,
    principal_claims: HashMap<Uuid, Vec<Claim>>,
    // role name -> attached claims, in creation order
    roles: Vec<(String, Vec<Claim>)>,
}

impl Inner {
    fn role_mut(&mut self, name: &str) -> Option<&mut (String, Vec<Claim>)> {
        self.roles.iter_mut().find(|(n, _)| n == name)
    }

    fn has_principal(&self, id: Uuid) -> bool {
        self.principals.iter().any(|p| p.id == id)
    }

    fn has_role(&self, name: &str) -> bool {
        self.roles.iter().any(|(n, _)| n == name)
    }

    fn holders(&self, role: &str) -> usize {
        self.principal_roles
            .values()
            .filter(|held| held.iter().any(|r| r == role))
            .count()
    }
}

/// Process-local credential store.
///
/// Used when no database is configured and by the test-suite. All state is lost
/// on restart.
pub struct MemoryCredentialStore {
    inner: RwLock<Inner>,
    bcrypt_cost: u32,
}

impl Default for MemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::with_cost(password::BCRYPT_COST)
    }

    /// Lower costs keep tests fast; bcrypt accepts 4..=31.
    pub fn with_cost(bcrypt_cost: u32) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            bcrypt_cost,
        }
    }

    async fn hash(&self, secret: &str) -> RepoResult<String> {
        let secret = secret.to_string();
        let cost = self.bcrypt_cost;
        // bcrypt is CPU-bound; keep it off the async workers.
        let hash = tokio::task::spawn_blocking(move || password::hash_password(&secret, cost))
            .await
            .map_err(|e| RepoError::Malformed(format!("password hashing task: {e}")))??;
        Ok(hash)
    }

    /// Every check and the insert happen under one write lock.
    async fn insert(
        &self,
        new: NewPrincipal<'_>,
        exclusive: Option<&str>,
        roles: &[&str],
    ) -> RepoResult<Principal> {
        // Hash outside the lock; bcrypt is the slow part.
        let password_hash = self.hash(new.password).await?;

        let mut inner = self.inner.write().await;
        if let Some(role) = exclusive
            && inner.holders(role) > 0
        {
            return Err(RepoError::RoleTaken(role.to_string()));
        }
        if let Some(missing) = roles.iter().find(|r| !inner.has_role(r)) {
            return Err(RepoError::RoleNotFound(missing.to_string()));
        }
        if inner
            .principals
            .iter()
            .any(|p| p.email.eq_ignore_ascii_case(new.email))
        {
            return Err(RepoError::Conflict);
        }
        if inner.principals.iter().any(|p| p.user_name == new.user_name) {
            return Err(RepoError::DuplicateUserName(new.user_name.to_string()));
        }

        let principal = Principal {
            id: Uuid::new_v4(),
            email: new.email.to_string(),
            user_name: new.user_name.to_string(),
            phone_number: new.phone_number.map(str::to_string),
            password_hash,
        };
        let mut held: Vec<String> = Vec::with_capacity(roles.len());
        for role in roles {
            if !held.iter().any(|r| r == role) {
                held.push(role.to_string());
            }
        }
        inner.principals.push(principal.clone());
        inner.principal_roles.insert(principal.id, held);

        Ok(principal)
    }

    /// Attaches a claim to an existing role.
    pub async fn add_role_claim(&self, role: &str, claim: Claim) -> RepoResult<()> {
        let mut inner = self.inner.write().await;
        let (_, claims) = inner
            .role_mut(role)
            .ok_or_else(|| RepoError::RoleNotFound(role.to_string()))?;
        claims.push(claim);
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<Principal>> {
        let inner = self.inner.read().await;
        Ok(inner
            .principals
            .iter()
            .find(|p| p.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Principal>> {
        let inner = self.inner.read().await;
        Ok(inner.principals.iter().find(|p| p.id == id).cloned())
    }

    async fn verify_secret(&self, principal: &Principal, secret: &str) -> RepoResult<bool> {
        let hash = principal.password_hash.clone();
        let secret = secret.to_string();
        tokio::task::spawn_blocking(move || password::verify_password(&secret, &hash))
            .await
            .map_err(|e| RepoError::Malformed(format!("password verification task: {e}")))
    }

    async fn roles(&self, principal: &Principal) -> RepoResult<Vec<String>> {
        let inner = self.inner.read().await;
        Ok(inner
            .principal_roles
            .get(&principal.id)
            .cloned()
            .unwrap_or_default())
    }

    async fn claims(&self, principal: &Principal) -> RepoResult<Vec<Claim>> {
        let inner = self.inner.read().await;
        Ok(inner
            .principal_claims
            .get(&principal.id)
            .cloned()
            .unwrap_or_default())
    }

    async fn role_claims(&self, role: &str) -> RepoResult<Option<Vec<Claim>>> {
        let inner = self.inner.read().await;
        Ok(inner
            .roles
            .iter()
            .find(|(name, _)| name == role)
            .map(|(_, claims)| claims.clone()))
    }

    async fn create_principal(
        &self,
        new: NewPrincipal<'_>,
        roles: &[&str],
    ) -> RepoResult<Principal> {
        self.insert(new, None, roles).await
    }

    async fn create_sole_holder(
        &self,
        new: NewPrincipal<'_>,
        exclusive: &str,
        roles: &[&str],
    ) -> RepoResult<Principal> {
        self.insert(new, Some(exclusive), roles).await
    }

    async fn add_role(&self, principal: &Principal, role: &str) -> RepoResult<()> {
        let mut inner = self.inner.write().await;
        if !inner.has_role(role) {
            return Err(RepoError::RoleNotFound(role.to_string()));
        }
        if !inner.has_principal(principal.id) {
            return Err(RepoError::PrincipalNotFound);
        }

        let held = inner.principal_roles.entry(principal.id).or_default();
        if !held.iter().any(|r| r == role) {
            held.push(role.to_string());
        }
        Ok(())
    }

    async fn add_claim(&self, principal: &Principal, claim: &Claim) -> RepoResult<()> {
        let mut inner = self.inner.write().await;
        if !inner.has_principal(principal.id) {
            return Err(RepoError::PrincipalNotFound);
        }
        inner
            .principal_claims
            .entry(principal.id)
            .or_default()
            .push(claim.clone());
        Ok(())
    }

    async fn ensure_role(&self, role: &str) -> RepoResult<()> {
        let mut inner = self.inner.write().await;
        if !inner.has_role(role) {
            inner.roles.push((role.to_string(), Vec::new()));
        }
        Ok(())
    }

    async fn role_exists(&self, role: &str) -> RepoResult<bool> {
        Ok(self.inner.read().await.has_role(role))
    }

    async fn count_in_role(&self, role: &str) -> RepoResult<u64> {
        Ok(self.inner.read().await.holders(role) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_principal<'a>(email: &'a str, user_name: &'a str) -> NewPrincipal<'a> {
        NewPrincipal {
            user_name,
            email,
            phone_number: Some("0400000000"),
            password: "Password12!",
        }
    }

    #[tokio::test]
    async fn email_is_unique_ignoring_case() {
        let store = MemoryCredentialStore::with_cost(4);
        store
            .create_principal(new_principal("a@x.com", "a"), &[])
            .await
            .expect("first");

        let err = store
            .create_principal(new_principal("A@X.COM", "b"), &[])
            .await
            .expect_err("duplicate email");
        assert!(matches!(err, RepoError::Conflict));

        let found = store.find_by_email("A@x.Com").await.expect("lookup");
        assert_eq!(found.map(|p| p.user_name), Some("a".to_string()));
    }

    #[tokio::test]
    async fn duplicate_username_is_reported() {
        let store = MemoryCredentialStore::with_cost(4);
        store
            .create_principal(new_principal("a@x.com", "a"), &[])
            .await
            .expect("first");

        let err = store
            .create_principal(new_principal("b@x.com", "a"), &[])
            .await
            .expect_err("duplicate username");
        assert!(matches!(err, RepoError::DuplicateUserName(name) if name == "a"));
    }

    #[tokio::test]
    async fn roles_must_exist_before_grant_and_grants_are_idempotent() {
        let store = MemoryCredentialStore::with_cost(4);
        let p = store
            .create_principal(new_principal("a@x.com", "a"), &[])
            .await
            .expect("create");

        let err = store.add_role(&p, "User").await.expect_err("missing role");
        assert!(matches!(err, RepoError::RoleNotFound(_)));

        store.ensure_role("User").await.expect("ensure");
        store.ensure_role("User").await.expect("ensure again");
        store.add_role(&p, "User").await.expect("grant");
        store.add_role(&p, "User").await.expect("grant again");

        assert_eq!(store.roles(&p).await.expect("roles"), vec!["User"]);
        assert_eq!(store.count_in_role("User").await.expect("count"), 1);
        assert_eq!(store.count_in_role("Admin").await.expect("count"), 0);
    }

    #[tokio::test]
    async fn secrets_and_role_claims() {
        let store = MemoryCredentialStore::with_cost(4);
        let p = store
            .create_principal(new_principal("a@x.com", "a"), &[])
            .await
            .expect("create");

        assert!(store.verify_secret(&p, "Password12!").await.expect("verify"));
        assert!(!store.verify_secret(&p, "nope").await.expect("verify"));

        assert_eq!(store.role_claims("Admin").await.expect("lookup"), None);
        store.ensure_role("Admin").await.expect("ensure");
        store
            .add_role_claim("Admin", Claim::new("can", "write"))
            .await
            .expect("role claim");
        assert_eq!(
            store.role_claims("Admin").await.expect("lookup"),
            Some(vec![Claim::new("can", "write")])
        );
    }

    #[tokio::test]
    async fn missing_role_stores_nothing() {
        let store = MemoryCredentialStore::with_cost(4);
        store.ensure_role("User").await.expect("ensure");

        let err = store
            .create_principal(new_principal("a@x.com", "a"), &["User", "Ghost"])
            .await
            .expect_err("missing role");
        assert!(matches!(err, RepoError::RoleNotFound(role) if role == "Ghost"));
        assert!(store.find_by_email("a@x.com").await.expect("lookup").is_none());

        // the same identity can be created once the role set is valid
        let p = store
            .create_principal(new_principal("a@x.com", "a"), &["User", "User"])
            .await
            .expect("create");
        assert_eq!(store.roles(&p).await.expect("roles"), vec!["User"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn only_one_sole_holder_under_contention() {
        let store = std::sync::Arc::new(MemoryCredentialStore::with_cost(4));
        store.ensure_role("Admin").await.expect("ensure");
        store.ensure_role("User").await.expect("ensure");

        let mut tasks = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                let email = format!("admin{i}@x.com");
                let name = format!("admin{i}");
                store
                    .create_sole_holder(new_principal(&email, &name), "Admin", &["Admin", "User"])
                    .await
            }));
        }

        let mut created = 0;
        for task in tasks {
            match task.await.expect("join") {
                Ok(_) => created += 1,
                Err(e) => assert!(matches!(e, RepoError::RoleTaken(_))),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(store.count_in_role("Admin").await.expect("count"), 1);
    }
}
