//! Response envelope post-processing.
//!
//! Every error response leaves the server as `{"Message": [...]}`:
//! - bodiless / non-JSON errors (route miss, 405, 408, 413, ...) get the default
//!   message for their status
//! - 500 responses carrying a [`Fault`] get the fault description appended when
//!   diagnostic mode (`EXPOSE_FAULT_DETAILS`) is on
//!
//! Handlers never build error bodies themselves; they return `AppError`.

use axum::{
    Json, Router,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};

use crate::api::dto::envelope::Envelope;
use crate::config::Config;
use crate::error::{
    FORBIDDEN_MESSAGE, Fault, INTERNAL_MESSAGE, NOT_FOUND_MESSAGE, UNAUTHORIZED_MESSAGE,
};

pub fn apply(router: Router, config: &Config) -> Router {
    router.layer(middleware::from_fn_with_state(
        config.expose_fault_details,
        envelope_middleware,
    ))
}

async fn envelope_middleware(
    State(expose_fault_details): State<bool>,
    req: Request,
    next: Next,
) -> Response {
    let res = next.run(req).await;
    finish(res, expose_fault_details)
}

fn default_message(status: StatusCode) -> String {
    match status {
        StatusCode::UNAUTHORIZED => UNAUTHORIZED_MESSAGE.to_string(),
        StatusCode::FORBIDDEN => FORBIDDEN_MESSAGE.to_string(),
        StatusCode::NOT_FOUND => NOT_FOUND_MESSAGE.to_string(),
        StatusCode::INTERNAL_SERVER_ERROR => INTERNAL_MESSAGE.to_string(),
        other => other
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
    }
}

fn is_json(res: &Response) -> bool {
    res.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

fn finish(res: Response, expose_fault_details: bool) -> Response {
    let status = res.status();
    if !status.is_client_error() && !status.is_server_error() {
        return res;
    }

    let fault = res
        .extensions()
        .get::<Fault>()
        .filter(|_| expose_fault_details)
        .cloned();

    let messages = match fault {
        Some(Fault(detail)) => vec![INTERNAL_MESSAGE.to_string(), detail],
        None if is_json(&res) => return res,
        None => vec![default_message(status)],
    };

    let (mut parts, _) = res.into_parts();
    let (rendered, body) = Json(Envelope::new(messages)).into_response().into_parts();

    parts.headers.remove(header::CONTENT_LENGTH);
    if let Some(content_type) = rendered.headers.get(header::CONTENT_TYPE) {
        parts
            .headers
            .insert(header::CONTENT_TYPE, content_type.clone());
    }

    Response::from_parts(parts, body)
}
