use crate::error::{AppError, NOT_FOUND_MESSAGE};

/// Route miss. Method mismatches (405) are filled in by the envelope middleware.
pub async fn fallback() -> AppError {
    AppError::not_found(NOT_FOUND_MESSAGE)
}
