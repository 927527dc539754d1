//! Claim model shared by the credential store, the token issuer and the gate.
//!
//! A `ClaimSet` is an ordered multiset of `(type, value)` pairs. On the wire it
//! becomes a JSON object where a type that appears more than once turns into an
//! array, the same shape other JWT stacks emit for repeated `role` claims.

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::repos::credentials::Principal;

pub const EMAIL: &str = "email";
pub const SUBJECT: &str = "sub";
pub const TOKEN_ID: &str = "jti";
pub const NAME_IDENTIFIER: &str = "nameid";
pub const USER_NAME: &str = "unique_name";
pub const ROLE: &str = "role";

/// Envelope claims owned by the signer. Stored claims never override them.
pub const REGISTERED: [&str; 5] = ["iss", "aud", "exp", "nbf", "iat"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub claim_type: String,
    pub value: String,
}

impl Claim {
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimSet(Vec<Claim>);

impl ClaimSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, claim: Claim) {
        self.0.push(claim);
    }

    pub fn extend(&mut self, claims: impl IntoIterator<Item = Claim>) {
        self.0.extend(claims);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Claim> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, claim: &Claim) -> bool {
        self.0.contains(claim)
    }

    /// First value of the given type.
    pub fn first(&self, claim_type: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|c| c.claim_type == claim_type)
            .map(|c| c.value.as_str())
    }

    /// All values of the given type, in order.
    pub fn values<'a>(&'a self, claim_type: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |c| c.claim_type == claim_type)
            .map(|c| c.value.as_str())
    }

    pub fn to_json(&self) -> Map<String, Value> {
        let mut map = Map::new();
        for claim in &self.0 {
            if REGISTERED.contains(&claim.claim_type.as_str()) {
                tracing::debug!(claim_type = %claim.claim_type, "skipping registered claim name");
                continue;
            }
            let value = Value::String(claim.value.clone());
            match map.get_mut(&claim.claim_type) {
                None => {
                    map.insert(claim.claim_type.clone(), value);
                }
                Some(Value::Array(items)) => items.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
            }
        }
        map
    }

    /// Flattens a decoded payload back into claims. Strings and arrays of
    /// scalars are kept; objects and nulls are dropped.
    pub fn from_json(map: &Map<String, Value>) -> Self {
        let mut set = Self::new();
        for (claim_type, value) in map {
            match value {
                Value::Array(items) => {
                    for item in items {
                        if let Some(v) = scalar_to_string(item) {
                            set.push(Claim::new(claim_type.clone(), v));
                        }
                    }
                }
                other => {
                    if let Some(v) = scalar_to_string(other) {
                        set.push(Claim::new(claim_type.clone(), v));
                    }
                }
            }
        }
        set
    }
}

impl IntoIterator for ClaimSet {
    type Item = Claim;
    type IntoIter = std::vec::IntoIter<Claim>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Builds the claim set embedded in an access token.
///
/// Order: identity claims, the principal's direct claims, then for every held
/// role a `role` claim followed by the claims attached to that role. Roles the
/// resolver does not know are skipped.
pub fn assemble_claims<F>(
    principal: &Principal,
    token_id: Uuid,
    direct_claims: &[Claim],
    roles: &[String],
    resolve_role: F,
) -> ClaimSet
where
    F: Fn(&str) -> Option<Vec<Claim>>,
{
    let mut set = ClaimSet::new();
    set.push(Claim::new(EMAIL, principal.email.clone()));
    set.push(Claim::new(SUBJECT, principal.email.clone()));
    set.push(Claim::new(TOKEN_ID, token_id.to_string()));
    set.push(Claim::new(NAME_IDENTIFIER, principal.id.to_string()));
    set.push(Claim::new(USER_NAME, principal.user_name.clone()));

    set.extend(direct_claims.iter().cloned());

    for role in roles {
        set.push(Claim::new(ROLE, role.clone()));
        match resolve_role(role) {
            Some(role_claims) => set.extend(role_claims),
            None => tracing::debug!(role = %role, "role not resolvable, skipping its claims"),
        }
    }

    set
}
