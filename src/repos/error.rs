/*
 * Responsibility
 * - repo が上位に伝える意味の定義
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("conflict")]
    Conflict,
    #[error("username already taken: {0}")]
    DuplicateUserName(String),
    #[error("role not found: {0}")]
    RoleNotFound(String),
    #[error("role already held: {0}")]
    RoleTaken(String),
    #[error("principal not found")]
    PrincipalNotFound,
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("stored value is malformed: {0}")]
    Malformed(String),
}

pub type RepoResult<T> = Result<T, RepoError>;

impl RepoError {
    /// Unique violations carry meaning for callers; everything else stays a db error.
    pub fn from_sqlx(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(dbe) = &e
            && dbe.code().as_deref() == Some("23505")
        {
            return RepoError::Conflict;
        }
        RepoError::Db(e)
    }
}
