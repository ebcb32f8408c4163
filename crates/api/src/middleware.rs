use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use claimdesk_auth::{AccessRequirement, AuthError, AuthGate};

use crate::app::errors;
use crate::context::CallerContext;

#[derive(Clone)]
pub struct AuthState {
    pub gate: Arc<AuthGate>,
    pub requirement: AccessRequirement,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers()).map_err(errors::auth_error_to_response)?;

    let identity = state
        .gate
        .authenticate(token, &state.requirement, Utc::now())
        .await
        .map_err(errors::auth_error_to_response)?;

    if let Some(identity) = identity {
        req.extensions_mut().insert(CallerContext::new(identity));
    }

    Ok(next.run(req).await)
}

/// Bearer token from the `Authorization` header, if any.
///
/// A header that is present but malformed is rejected rather than treated as absent.
fn extract_bearer(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    let Some(header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let header = header.to_str().map_err(|_| AuthError::Invalid)?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::Invalid)?
        .trim();
    if token.is_empty() {
        return Err(AuthError::MissingCredential);
    }

    Ok(Some(token))
}
