/*
 * Responsibility
 * - Login / RegisterUser (と Setup/Initialize) の request DTO
 * - 入力ルールは Validate で宣言する
 */
use serde::Deserialize;

use crate::services::validation::{Validate, Validator};

/// Stored usernames and e-mails are capped at this length.
pub const MAX_IDENTITY_LEN: usize = 512;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoginRequest {
    #[serde(alias = "email")]
    pub email: Option<String>,
    #[serde(alias = "password")]
    pub password: Option<String>,
}

impl Validate for LoginRequest {
    fn validate(&self, v: &mut Validator) {
        v.field("Email", self.email.as_deref()).required().email();
        v.field("Password", self.password.as_deref()).required();
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RegisterUserRequest {
    #[serde(alias = "username")]
    pub username: Option<String>,
    #[serde(alias = "email")]
    pub email: Option<String>,
    #[serde(alias = "mobileNumber")]
    pub mobile_number: Option<String>,
    #[serde(alias = "password")]
    pub password: Option<String>,
}

impl RegisterUserRequest {
    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or_default()
    }

    pub fn email(&self) -> &str {
        self.email.as_deref().unwrap_or_default()
    }

    pub fn password(&self) -> &str {
        self.password.as_deref().unwrap_or_default()
    }
}

impl Validate for RegisterUserRequest {
    fn validate(&self, v: &mut Validator) {
        v.field("Username", self.username.as_deref())
            .required()
            .max_len(MAX_IDENTITY_LEN);
        v.field("Email", self.email.as_deref())
            .required()
            .email()
            .max_len(MAX_IDENTITY_LEN);
        v.field("MobileNumber", self.mobile_number.as_deref())
            .required()
            .phone();
        v.field("Password", self.password.as_deref()).required();
    }
}
