//! Password hashing via bcrypt, plus the strength policy applied on registration.

/// bcrypt cost factor.
pub const BCRYPT_COST: u32 = 10;

const MIN_LENGTH: usize = 6;

pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, cost)
}

/// A hash that cannot be parsed counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(password, hash) {
        Ok(ok) => ok,
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash is unreadable");
            false
        }
    }
}

/// Every rule the password breaks, in a stable order. Empty means acceptable.
pub fn policy_violations(password: &str) -> Vec<String> {
    let mut violations = Vec::new();

    if password.chars().count() < MIN_LENGTH {
        violations.push(format!("Passwords must be at least {MIN_LENGTH} characters."));
    }
    if password.chars().all(|c| c.is_alphanumeric()) {
        violations.push("Passwords must have at least one non alphanumeric character.".into());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        violations.push("Passwords must have at least one digit ('0'-'9').".into());
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        violations.push("Passwords must have at least one lowercase ('a'-'z').".into());
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        violations.push("Passwords must have at least one uppercase ('A'-'Z').".into());
    }

    violations
}
