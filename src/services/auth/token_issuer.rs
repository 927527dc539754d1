use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::services::auth::claims::ClaimSet;
use crate::services::auth::jwt::JwtIssuer;

const WINDOW_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Serialize)]
struct AccessTokenClaims<'a> {
    iss: &'a str,
    aud: &'a str,
    nbf: i64,
    exp: i64,
    #[serde(flatten)]
    claims: Map<String, Value>,
}

/// A signed access token plus the window it is valid for.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
}

impl IssuedToken {
    /// `Valid from 2024-01-01 10:00:00 UTC to 2024-01-01 11:00:00 UTC`
    pub fn validity_window(&self) -> String {
        format!(
            "Valid from {} UTC to {} UTC",
            self.valid_from.format(WINDOW_FORMAT),
            self.valid_to.format(WINDOW_FORMAT)
        )
    }
}

#[derive(Clone, Debug)]
pub struct TokenIssuer {
    jwt: JwtIssuer,
}

impl TokenIssuer {
    pub fn new(jwt: JwtIssuer) -> Self {
        Self { jwt }
    }

    /// Sign an already assembled claim set. `nbf` is now, `exp` is now + ttl.
    pub fn issue(&self, claims: &ClaimSet) -> Result<IssuedToken, AppError> {
        self.issue_at(claims, Utc::now())
    }

    pub(crate) fn issue_at(
        &self,
        claims: &ClaimSet,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AppError> {
        let ttl = i64::try_from(self.jwt.ttl_seconds())
            .map_err(|_| AppError::internal("access token ttl out of range"))?;
        // Second precision; JWT timestamps are whole seconds.
        let valid_from = DateTime::<Utc>::from_timestamp(now.timestamp(), 0).unwrap_or(now);
        let valid_to = valid_from + Duration::seconds(ttl);

        let payload = AccessTokenClaims {
            iss: self.jwt.issuer(),
            aud: self.jwt.audience(),
            nbf: valid_from.timestamp(),
            exp: valid_to.timestamp(),
            claims: claims.to_json(),
        };

        let token = self.jwt.sign(&payload)?;

        Ok(IssuedToken {
            token,
            valid_from,
            valid_to,
        })
    }
}
