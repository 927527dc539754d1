/*
 * Responsibility
 * - 管理者向け (role / claim 付与) の request DTO
 */
use serde::Deserialize;

use crate::services::validation::{Validate, Validator};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssignRoleRequest {
    #[serde(alias = "email")]
    pub email: Option<String>,
    #[serde(alias = "role")]
    pub role: Option<String>,
}

impl Validate for AssignRoleRequest {
    fn validate(&self, v: &mut Validator) {
        v.field("Email", self.email.as_deref()).required().email();
        v.field("Role", self.role.as_deref()).required();
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssignClaimRequest {
    #[serde(alias = "email")]
    pub email: Option<String>,
    #[serde(alias = "type")]
    pub r#type: Option<String>,
    #[serde(alias = "value")]
    pub value: Option<String>,
}

impl Validate for AssignClaimRequest {
    fn validate(&self, v: &mut Validator) {
        v.field("Email", self.email.as_deref()).required().email();
        v.field("Type", self.r#type.as_deref()).required();
        v.field("Value", self.value.as_deref()).required();
    }
}
