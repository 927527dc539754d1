/*
 * Responsibility
 * - POST /api/Auth/Login, /api/Auth/RegisterUser
 * - 匿名アクセス可 (policy なし)
 * - principal 作成は Setup/Initialize と共通 (create_account)
 */
use axum::{Json, extract::State};

use crate::api::dto::{auth::LoginRequest, auth::RegisterUserRequest, envelope::Envelope};
use crate::api::extractors::ValidJson;
use crate::error::{AppError, AppResult};
use crate::repos::credentials::{NewPrincipal, Principal};
use crate::repos::error::RepoError;
use crate::services::auth::password;
use crate::services::auth::policy::{ADMIN_ROLE, USER_ROLE};
use crate::state::AppState;

pub const USER_NOT_FOUND: &str = "User is not found on this server.";
pub const BAD_CREDENTIALS: &str = "Email or password is incorrect!";
pub const ADMIN_EXISTS: &str = "Admin user already exists.";

pub async fn login(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> AppResult<Json<Envelope>> {
    let email = req.email.as_deref().unwrap_or_default();
    let password = req.password.as_deref().unwrap_or_default();

    let Some(principal) = state.credentials.find_by_email(email).await? else {
        tracing::debug!(email = %email, "login for unknown e-mail");
        return Err(AppError::not_found(USER_NOT_FOUND));
    };

    if !state.credentials.verify_secret(&principal, password).await? {
        tracing::debug!(user_id = %principal.id, "invalid login attempt");
        return Err(AppError::business(BAD_CREDENTIALS));
    }

    let issued = state
        .tokens
        .issue_for(state.credentials.as_ref(), &principal)
        .await?;

    let window = issued.validity_window();
    Ok(Json(Envelope::new(vec![issued.token, window])))
}

pub async fn register_user(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RegisterUserRequest>,
) -> AppResult<Json<Envelope>> {
    let username = req.username();

    if state.credentials.find_by_email(req.email()).await?.is_some() {
        let message = format!(
            "Failed to add user with Username: {}/Email: {}",
            username,
            req.email()
        );
        tracing::debug!("{message}");
        return Err(AppError::Conflict(vec![
            message,
            "User already exists".to_string(),
        ]));
    }

    create_account(&state, &req, Enrolment::Registration).await?;

    Ok(Json(Envelope::single(format!(
        "{username} was successfully registered"
    ))))
}

/// How a new account enters the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Enrolment {
    /// Self-registration: `User`.
    Registration,
    /// Backend initialisation: `Admin` and `User`, only while nobody holds `Admin`.
    FirstAdmin,
}

impl Enrolment {
    fn roles(self) -> &'static [&'static str] {
        match self {
            Enrolment::Registration => &[USER_ROLE],
            Enrolment::FirstAdmin => &[ADMIN_ROLE, USER_ROLE],
        }
    }

    fn failure(self, username: &str) -> String {
        match self {
            Enrolment::Registration => format!("Failed to register {username}"),
            Enrolment::FirstAdmin => format!("Failed to create user: {username}"),
        }
    }

    fn role_failure(self, role: &str, username: &str) -> String {
        match self {
            Enrolment::Registration => format!("Failed to add {username} to {role} role"),
            Enrolment::FirstAdmin => format!("Failed to add {role} role to user: {username}"),
        }
    }
}

/// Check the password policy, then create the principal together with its roles.
///
/// The store does both in one step, so a failure never leaves a principal without
/// roles behind. Every failure is a 400 whose first message names the account,
/// except `Admin user already exists.` (401) for a second `FirstAdmin`.
pub(crate) async fn create_account(
    state: &AppState,
    req: &RegisterUserRequest,
    enrolment: Enrolment,
) -> AppResult<Principal> {
    let username = req.username();

    let violations = password::policy_violations(req.password());
    if !violations.is_empty() {
        tracing::debug!(user_name = %username, "password policy rejected");
        return Err(AppError::Business(
            std::iter::once(enrolment.failure(username))
                .chain(violations)
                .collect(),
        ));
    }

    let new = NewPrincipal {
        user_name: username,
        email: req.email(),
        phone_number: req.mobile_number.as_deref(),
        password: req.password(),
    };
    let created = match enrolment {
        Enrolment::Registration => state.credentials.create_principal(new, enrolment.roles()).await,
        Enrolment::FirstAdmin => {
            state
                .credentials
                .create_sole_holder(new, ADMIN_ROLE, enrolment.roles())
                .await
        }
    };

    match created {
        Ok(principal) => Ok(principal),
        Err(RepoError::RoleTaken(_)) => Err(AppError::Unauthorized(vec![
            ADMIN_EXISTS.to_string(),
        ])),
        Err(RepoError::RoleNotFound(role)) => {
            tracing::error!(role = %role, user_name = %username, "role missing at account creation");
            Err(AppError::business(enrolment.role_failure(&role, username)))
        }
        Err(RepoError::DuplicateUserName(name)) => Err(AppError::Business(vec![
            enrolment.failure(username),
            format!("Username '{name}' is already taken."),
        ])),
        Err(RepoError::Conflict) => Err(AppError::Business(vec![
            enrolment.failure(username),
            format!("Email '{}' is already taken.", req.email()),
        ])),
        Err(other) => Err(other.into()),
    }
}
