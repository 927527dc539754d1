/*
 * Responsibility
 * - body / query を deserialize し、Validate の宣言どおりに検証してから handler に渡す
 * - deserialize 失敗も検証失敗も 400 + {"Message": [...]} に揃える (body 上限超過のみ 413)
 */
use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{StatusCode, request::Parts},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::services::validation::{Validate, Validator};

fn run_rules<T: Validate>(value: &T) -> Result<(), AppError> {
    let mut v = Validator::new();
    value.validate(&mut v);
    v.finish().map_err(AppError::from)
}

/// JSON body that passed its declared rules.
#[derive(Debug)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                // body over the configured limit is not a validation failure
                if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    AppError::PayloadTooLarge(vec![rejection.body_text()])
                } else {
                    AppError::Validation(vec![rejection.body_text()])
                }
            })?;

        run_rules(&value)?;
        Ok(Self(value))
    }
}

/// Query string that passed its declared rules.
#[derive(Debug)]
pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::Validation(vec![rejection.body_text()]))?;

        run_rules(&value)?;
        Ok(Self(value))
    }
}
