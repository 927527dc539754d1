use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::credentials::store::{CredentialStore, NewPrincipal, Principal};
use crate::repos::error::{RepoError, RepoResult};
use crate::services::auth::claims::Claim;
use crate::services::auth::password;

/// Unique constraint guarding `users.user_name`.
const USER_NAME_CONSTRAINT: &str = "users_user_name_key";

/// Postgres-backed credential store.
///
/// Notes:
/// - Schema is owned by migrations outside this crate. Expected tables:
///   - users (id uuid pk, email text, user_name text unique, phone_number text null,
///     password_hash text, created_at timestamptz)
///     + unique index on lower(email)
///   - roles (id uuid pk, name text unique)
///   - user_roles (user_id uuid fk, role_id uuid fk, granted_at timestamptz, pk(user_id, role_id))
///   - user_claims (id bigserial, user_id uuid fk, claim_type text, claim_value text)
///   - role_claims (id bigserial, role_id uuid fk, claim_type text, claim_value text)
#[derive(Clone, Debug)]
pub struct PgCredentialStore {
    pool: PgPool,
    bcrypt_cost: u32,
}

#[derive(Debug, FromRow)]
struct PrincipalRow {
    id: Uuid,
    email: String,
    user_name: String,
    phone_number: Option<String>,
    password_hash: String,
}

impl From<PrincipalRow> for Principal {
    fn from(row: PrincipalRow) -> Self {
        Principal {
            id: row.id,
            email: row.email,
            user_name: row.user_name,
            phone_number: row.phone_number,
            password_hash: row.password_hash,
        }
    }
}

#[derive(Debug, FromRow)]
struct ClaimRow {
    claim_type: String,
    claim_value: String,
}

impl From<ClaimRow> for Claim {
    fn from(row: ClaimRow) -> Self {
        Claim::new(row.claim_type, row.claim_value)
    }
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            bcrypt_cost: password::BCRYPT_COST,
        }
    }

    async fn role_id(&self, role: &str) -> RepoResult<Option<Uuid>> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM roles WHERE name = $1
            "#,
        )
        .bind(role)
        .fetch_optional(&self.pool)
        .await?;

        Ok(id)
    }

    /// Insert the user and its role grants in one transaction.
    ///
    /// With `exclusive`, a transaction-scoped advisory lock keyed on the role name
    /// serialises concurrent callers before the holder check.
    async fn insert(
        &self,
        new: NewPrincipal<'_>,
        exclusive: Option<&str>,
        roles: &[&str],
    ) -> RepoResult<Principal> {
        let password = new.password.to_string();
        let cost = self.bcrypt_cost;
        // bcrypt is CPU-bound; keep it off the async workers.
        let password_hash =
            tokio::task::spawn_blocking(move || password::hash_password(&password, cost))
                .await
                .map_err(|e| RepoError::Malformed(format!("password hashing task: {e}")))??;

        let mut tx = self.pool.begin().await?;

        if let Some(role) = exclusive {
            sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
                .bind(role)
                .execute(&mut *tx)
                .await?;

            let held = sqlx::query_scalar::<_, bool>(
                r#"
                SELECT EXISTS (
                    SELECT 1
                    FROM user_roles ur
                    JOIN roles r ON r.id = ur.role_id
                    WHERE r.name = $1
                )
                "#,
            )
            .bind(role)
            .fetch_one(&mut *tx)
            .await?;

            if held {
                return Err(RepoError::RoleTaken(role.to_string()));
            }
        }

        let row = sqlx::query_as::<_, PrincipalRow>(
            r#"
            INSERT INTO users (email, user_name, phone_number, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, user_name, phone_number, password_hash
            "#,
        )
        .bind(new.email)
        .bind(new.user_name)
        .bind(new.phone_number)
        .bind(&password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(dbe) = &e
                && dbe.constraint() == Some(USER_NAME_CONSTRAINT)
            {
                return RepoError::DuplicateUserName(new.user_name.to_string());
            }
            RepoError::from_sqlx(e)
        })?;

        for role in roles {
            let role_id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM roles WHERE name = $1")
                .bind(*role)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| RepoError::RoleNotFound(role.to_string()))?;

            sqlx::query(
                r#"
                INSERT INTO user_roles (user_id, role_id)
                VALUES ($1, $2)
                ON CONFLICT (user_id, role_id) DO NOTHING
                "#,
            )
            .bind(row.id)
            .bind(role_id)
            .execute(&mut *tx)
            .await?;
        }

        // an early return drops `tx` and rolls back
        tx.commit().await?;
        Ok(row.into())
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<Principal>> {
        let row = sqlx::query_as::<_, PrincipalRow>(
            r#"
            SELECT id, email, user_name, phone_number, password_hash
            FROM users
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Principal::from))
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Principal>> {
        let row = sqlx::query_as::<_, PrincipalRow>(
            r#"
            SELECT id, email, user_name, phone_number, password_hash
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Principal::from))
    }

    async fn verify_secret(&self, principal: &Principal, secret: &str) -> RepoResult<bool> {
        let hash = principal.password_hash.clone();
        let secret = secret.to_string();
        // bcrypt is CPU-bound; keep it off the async workers.
        tokio::task::spawn_blocking(move || password::verify_password(&secret, &hash))
            .await
            .map_err(|e| RepoError::Malformed(format!("password verification task: {e}")))
    }

    async fn roles(&self, principal: &Principal) -> RepoResult<Vec<String>> {
        let names = sqlx::query_scalar::<_, String>(
            r#"
            SELECT r.name
            FROM user_roles ur
            JOIN roles r ON r.id = ur.role_id
            WHERE ur.user_id = $1
            ORDER BY ur.granted_at, r.name
            "#,
        )
        .bind(principal.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(names)
    }

    async fn claims(&self, principal: &Principal) -> RepoResult<Vec<Claim>> {
        let rows = sqlx::query_as::<_, ClaimRow>(
            r#"
            SELECT claim_type, claim_value
            FROM user_claims
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(principal.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Claim::from).collect())
    }

    async fn role_claims(&self, role: &str) -> RepoResult<Option<Vec<Claim>>> {
        let Some(role_id) = self.role_id(role).await? else {
            return Ok(None);
        };

        let rows = sqlx::query_as::<_, ClaimRow>(
            r#"
            SELECT claim_type, claim_value
            FROM role_claims
            WHERE role_id = $1
            ORDER BY id
            "#,
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(rows.into_iter().map(Claim::from).collect()))
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
        let role_id = self
            .role_id(role)
            .await?
            .ok_or_else(|| RepoError::RoleNotFound(role.to_string()))?;

        let result = sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            SELECT $1, $2
            WHERE EXISTS (SELECT 1 FROM users WHERE id = $1)
            ON CONFLICT (user_id, role_id) DO NOTHING
            "#,
        )
        .bind(principal.id)
        .bind(role_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 && self.find_by_id(principal.id).await?.is_none() {
            return Err(RepoError::PrincipalNotFound);
        }
        Ok(())
    }

    async fn add_claim(&self, principal: &Principal, claim: &Claim) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_claims (user_id, claim_type, claim_value)
            SELECT $1, $2, $3
            WHERE EXISTS (SELECT 1 FROM users WHERE id = $1)
            "#,
        )
        .bind(principal.id)
        .bind(&claim.claim_type)
        .bind(&claim.value)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepoError::PrincipalNotFound);
        }
        Ok(())
    }

    async fn ensure_role(&self, role: &str) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO roles (id, name)
            VALUES ($1, $2)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(role)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn role_exists(&self, role: &str) -> RepoResult<bool> {
        Ok(self.role_id(role).await?.is_some())
    }

    async fn count_in_role(&self, role: &str) -> RepoResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM user_roles ur
            JOIN roles r ON r.id = ur.role_id
            WHERE r.name = $1
            "#,
        )
        .bind(role)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u64)
    }
}
