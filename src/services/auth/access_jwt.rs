use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::{error::Error as StdError, fmt};
use uuid::Uuid;

use crate::services::auth::claims::{self, ClaimSet};

// Errors returned by access-token verification + claim validation.
#[derive(Debug)]
pub enum AccessJwtError {
    Jwt(jsonwebtoken::errors::Error),
    EmptyClaim(&'static str),
    InvalidNameId,
}

impl fmt::Display for AccessJwtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jwt(e) => write!(f, "jwt verification failed: {}", e),
            Self::EmptyClaim(name) => write!(f, "empty '{}' claim", name),
            Self::InvalidNameId => write!(f, "invalid 'nameid' (expected UUID)"),
        }
    }
}

impl StdError for AccessJwtError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Jwt(e) => Some(e),
            _ => None,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AccessJwtError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        Self::Jwt(e)
    }
}

/// Decoded access-token payload.
///
/// NOTE:
/// - `aud` is embedded by the issuer but not validated here; kept as Value so both
///   string and array forms decode.
/// - Everything that is not an envelope claim lands in `claims`.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenClaims {
    pub iss: String,
    #[serde(default)]
    pub aud: Value,
    pub nbf: i64,
    pub exp: i64,
    #[serde(flatten)]
    pub claims: Map<String, Value>,
}

/// Verified token, reduced to what request handling needs.
#[derive(Debug, Clone)]
pub struct VerifiedAccessToken {
    pub user_id: Uuid,
    pub email: String,
    pub user_name: String,
    pub roles: Vec<String>,
    pub jti: Option<String>,
    pub claims: ClaimSet,
}

/// HS512 access-token verifier.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct AccessTokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for AccessTokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("AccessTokenVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl AccessTokenVerifier {
    pub fn new(signing_key: &[u8], issuer: &str, leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS512);
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss"]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.leeway = leeway_seconds;

        Self {
            decoding_key: DecodingKey::from_secret(signing_key),
            validation,
        }
    }

    // Verify and decode a JWT access token.
    pub fn verify(&self, token: &str) -> Result<AccessTokenClaims, jsonwebtoken::errors::Error> {
        let data =
            jsonwebtoken::decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)?;

        Ok(data.claims)
    }

    /// Verify, then rebuild the claim set and pull out the identity.
    ///
    /// `jsonwebtoken::Validation` already checks signature, `iss`, `exp` and `nbf`.
    /// This adds: `nameid` is a UUID, `email` is present and not blank.
    pub fn verify_verified(&self, token: &str) -> Result<VerifiedAccessToken, AccessJwtError> {
        let decoded = self.verify(token)?;
        let claims = ClaimSet::from_json(&decoded.claims);

        let user_id = claims
            .first(claims::NAME_IDENTIFIER)
            .and_then(|v| Uuid::parse_str(v).ok())
            .ok_or(AccessJwtError::InvalidNameId)?;

        let email = claims
            .first(claims::EMAIL)
            .filter(|v| !v.trim().is_empty())
            .ok_or(AccessJwtError::EmptyClaim(claims::EMAIL))?
            .to_string();

        let user_name = claims
            .first(claims::USER_NAME)
            .unwrap_or_default()
            .to_string();
        let roles = claims.values(claims::ROLE).map(str::to_string).collect();
        let jti = claims.first(claims::TOKEN_ID).map(str::to_string);

        Ok(VerifiedAccessToken {
            user_id,
            email,
            user_name,
            roles,
            jti,
            claims,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::credentials::Principal;
    use crate::services::auth::claims::{Claim, assemble_claims};
    use crate::services::auth::jwt::JwtIssuer;
    use crate::services::auth::token_issuer::TokenIssuer;
    use chrono::{Duration, Utc};

    const KEY: [u8; 64] = [42u8; 64];

    fn token_issuer(key: &[u8], issuer: &str, ttl: u64) -> TokenIssuer {
        TokenIssuer::new(JwtIssuer::new(
            key,
            issuer.into(),
            "SunsetStories users".into(),
            ttl,
        ))
    }

    fn claim_set() -> (Principal, ClaimSet) {
        let p = Principal {
            id: Uuid::new_v4(),
            email: "a@x.com".into(),
            user_name: "a".into(),
            phone_number: None,
            password_hash: String::new(),
        };
        let roles = vec!["User".to_string(), "Admin".to_string()];
        let set = assemble_claims(
            &p,
            Uuid::new_v4(),
            &[Claim::new("tier", "gold")],
            &roles,
            |r| (r == "Admin").then(|| vec![Claim::new("can", "write")]),
        );
        (p, set)
    }

    #[test]
    fn issued_token_round_trips_identity_roles_and_claims() {
        let (p, set) = claim_set();
        let issued = token_issuer(&KEY, "SunsetStories", 3600)
            .issue(&set)
            .expect("issue");

        let verified = AccessTokenVerifier::new(&KEY, "SunsetStories", 0)
            .verify_verified(&issued.token)
            .expect("verify");

        assert_eq!(verified.user_id, p.id);
        assert_eq!(verified.email, "a@x.com");
        assert_eq!(verified.user_name, "a");
        assert_eq!(verified.roles, vec!["User", "Admin"]);
        assert!(verified.claims.contains(&Claim::new("tier", "gold")));
        assert!(verified.claims.contains(&Claim::new("can", "write")));
        assert!(verified.jti.is_some());
    }

    #[test]
    fn expired_token_is_rejected() {
        let (_, set) = claim_set();
        let past = Utc::now() - Duration::hours(3);
        let issued = token_issuer(&KEY, "SunsetStories", 3600)
            .issue_at(&set, past)
            .expect("issue");

        let err = AccessTokenVerifier::new(&KEY, "SunsetStories", 0)
            .verify_verified(&issued.token)
            .expect_err("expired");
        assert!(matches!(err, AccessJwtError::Jwt(_)));
    }

    #[test]
    fn token_from_a_different_key_is_rejected() {
        let (_, set) = claim_set();
        let issued = token_issuer(&[1u8; 64], "SunsetStories", 3600)
            .issue(&set)
            .expect("issue");

        assert!(
            AccessTokenVerifier::new(&KEY, "SunsetStories", 0)
                .verify_verified(&issued.token)
                .is_err()
        );
    }

    #[test]
    fn foreign_issuer_is_rejected() {
        let (_, set) = claim_set();
        let issued = token_issuer(&KEY, "SomeoneElse", 3600)
            .issue(&set)
            .expect("issue");

        assert!(
            AccessTokenVerifier::new(&KEY, "SunsetStories", 0)
                .verify_verified(&issued.token)
                .is_err()
        );
    }

    #[test]
    fn audience_is_not_checked() {
        let (p, set) = claim_set();
        let issued = TokenIssuer::new(JwtIssuer::new(
            &KEY,
            "SunsetStories".into(),
            "someone-else".into(),
            3600,
        ))
        .issue(&set)
        .expect("issue");

        let verified = AccessTokenVerifier::new(&KEY, "SunsetStories", 0)
            .verify_verified(&issued.token)
            .expect("aud is informational");
        assert_eq!(verified.user_id, p.id);
    }

    #[test]
    fn not_yet_valid_token_is_rejected() {
        let (_, set) = claim_set();
        let future = Utc::now() + Duration::hours(1);
        let issued = token_issuer(&KEY, "SunsetStories", 3600)
            .issue_at(&set, future)
            .expect("issue");

        assert!(
            AccessTokenVerifier::new(&KEY, "SunsetStories", 0)
                .verify_verified(&issued.token)
                .is_err()
        );
    }

    #[test]
    fn garbage_is_rejected() {
        let verifier = AccessTokenVerifier::new(&KEY, "SunsetStories", 0);
        assert!(verifier.verify_verified("not.a.token").is_err());
        assert!(verifier.verify_verified("").is_err());
    }
}
