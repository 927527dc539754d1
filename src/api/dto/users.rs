/*
 * Responsibility
 * - User の request/response DTO
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::credentials::Principal;
use crate::services::validation::{Validate, Validator};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FetchUserRequest {
    #[serde(alias = "email")]
    pub email: Option<String>,
}

impl Validate for FetchUserRequest {
    fn validate(&self, v: &mut Validator) {
        v.field("Email", self.email.as_deref()).required().email();
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserDto {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<Principal> for UserDto {
    fn from(p: Principal) -> Self {
        Self {
            id: p.id,
            username: p.user_name,
            email: p.email,
        }
    }
}
