use std::collections::HashMap;

use crate::config::Config;
use crate::error::AppError;
use crate::repos::credentials::{CredentialStore, Principal};
use crate::services::auth::access_jwt::{AccessJwtError, AccessTokenVerifier, VerifiedAccessToken};
use crate::services::auth::claims::{Claim, assemble_claims};
use crate::services::auth::jwt::JwtIssuer;
use crate::services::auth::token_issuer::{IssuedToken, TokenIssuer};

/// Issues access tokens for principals and verifies presented ones.
///
/// Both halves share the signing key read once from `Config`.
#[derive(Clone, Debug)]
pub struct TokenService {
    issuer: TokenIssuer,
    verifier: AccessTokenVerifier,
}

impl TokenService {
    pub fn new(issuer: TokenIssuer, verifier: AccessTokenVerifier) -> Self {
        Self { issuer, verifier }
    }

    pub fn from_config(config: &Config) -> Self {
        let jwt = JwtIssuer::new(
            &config.jwt_signing_key,
            config.auth_issuer.clone(),
            config.auth_audience.clone(),
            config.access_token_ttl_seconds,
        );
        let verifier = AccessTokenVerifier::new(
            &config.jwt_signing_key,
            &config.auth_issuer,
            config.access_token_leeway_seconds,
        );

        Self::new(TokenIssuer::new(jwt), verifier)
    }

    /// Look up the principal's claims and roles, then sign.
    pub async fn issue_for(
        &self,
        store: &dyn CredentialStore,
        principal: &Principal,
    ) -> Result<IssuedToken, AppError> {
        let direct = store.claims(principal).await?;
        let roles = store.roles(principal).await?;

        let mut role_claims: HashMap<String, Vec<Claim>> = HashMap::with_capacity(roles.len());
        for role in &roles {
            if let Some(claims) = store.role_claims(role).await? {
                role_claims.insert(role.clone(), claims);
            }
        }

        let claims = assemble_claims(
            principal,
            uuid::Uuid::new_v4(),
            &direct,
            &roles,
            |role| role_claims.get(role).cloned(),
        );

        self.issuer.issue(&claims)
    }

    pub fn verify(&self, token: &str) -> Result<VerifiedAccessToken, AccessJwtError> {
        self.verifier.verify_verified(token)
    }
}
