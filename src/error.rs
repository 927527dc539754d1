/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / {"Message": [...]} envelope)
 * - RepoError / validation error を AppError に変換 (BlobError は handler 側で message を決める)
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::api::dto::envelope::Envelope;
use crate::repos::error::RepoError;
use crate::services::validation::ValidationErrors;

pub const UNAUTHORIZED_MESSAGE: &str = "You are not authorized to access this resource.";
pub const FORBIDDEN_MESSAGE: &str = "Access this resource is forbidden.";
pub const NOT_FOUND_MESSAGE: &str = "Content does not exist on this server.";
pub const INTERNAL_MESSAGE: &str =
    "An internal server error has occurred, our developers have been notified.";

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("{}", .0.join("; "))]
    Business(Vec<String>),
    #[error("unauthorized: {}", .0.join("; "))]
    Unauthorized(Vec<String>),
    #[error("forbidden")]
    Forbidden,
    #[error("not found: {}", .0.join("; "))]
    NotFound(Vec<String>),
    #[error("conflict: {}", .0.join("; "))]
    Conflict(Vec<String>),
    #[error("payload too large: {}", .0.join("; "))]
    PayloadTooLarge(Vec<String>),
    #[error("internal server error: {0}")]
    Internal(String),
}

/// Fault description attached to 500 responses.
///
/// The envelope middleware decides whether it reaches the client
/// (diagnostic mode) or only the log.
#[derive(Debug, Clone)]
pub struct Fault(pub String);

impl AppError {
    pub fn business(message: impl Into<String>) -> Self {
        Self::Business(vec![message.into()])
    }

    pub fn unauthorized() -> Self {
        Self::Unauthorized(vec![UNAUTHORIZED_MESSAGE.to_string()])
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(vec![message.into()])
    }

    pub fn internal(detail: impl ToString) -> Self {
        Self::Internal(detail.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Business(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (messages, fault) = match self {
            AppError::Validation(m)
            | AppError::Business(m)
            | AppError::Unauthorized(m)
            | AppError::NotFound(m)
            | AppError::Conflict(m)
            | AppError::PayloadTooLarge(m) => (m, None),
            AppError::Forbidden => (vec![FORBIDDEN_MESSAGE.to_string()], None),
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed with an internal error");
                (vec![INTERNAL_MESSAGE.to_string()], Some(Fault(detail)))
            }
        };

        let mut res = (status, Json(Envelope::new(messages))).into_response();
        if let Some(fault) = fault {
            res.extensions_mut().insert(fault);
        }
        res
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict => AppError::Conflict(vec!["Resource already exists".into()]),
            RepoError::DuplicateUserName(name) => {
                AppError::business(format!("Username '{name}' is already taken."))
            }
            RepoError::RoleNotFound(role) => AppError::business(format!("Role does not exist: {role}")),
            RepoError::RoleTaken(role) => AppError::Conflict(vec![format!("Role is already held: {role}")]),
            other => AppError::internal(other),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(e: ValidationErrors) -> Self {
        AppError::Validation(e.into_messages())
    }
}
