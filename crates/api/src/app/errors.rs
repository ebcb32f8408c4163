use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use claimdesk_auth::{AuthError, DirectoryError};
use claimdesk_infra::ClaimError;

pub fn claim_error_to_response(err: ClaimError) -> axum::response::Response {
    let status = match &err {
        ClaimError::Forbidden(_) | ClaimError::Unauthorized(_) => StatusCode::FORBIDDEN,
        ClaimError::Conflict(_) => StatusCode::CONFLICT,
        ClaimError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    };
    json_error(status, err.code(), err.to_string())
}

pub fn auth_error_to_response(err: AuthError) -> axum::response::Response {
    match err {
        AuthError::MissingCredential => json_error(StatusCode::UNAUTHORIZED, "missing_credential", err.to_string()),
        AuthError::Expired => json_error(StatusCode::UNAUTHORIZED, "token_expired", err.to_string()),
        AuthError::Invalid => json_error(StatusCode::UNAUTHORIZED, "invalid_token", err.to_string()),
        AuthError::Revoked => json_error(StatusCode::FORBIDDEN, "token_revoked", err.to_string()),
        AuthError::InsufficientRole => json_error(StatusCode::FORBIDDEN, "insufficient_role", err.to_string()),
        AuthError::Directory(msg) => json_error(StatusCode::INTERNAL_SERVER_ERROR, "directory_error", msg),
    }
}

pub fn directory_error_to_response(err: DirectoryError) -> axum::response::Response {
    match err {
        DirectoryError::NotFound => json_error(StatusCode::BAD_REQUEST, "not_found", "User info is not exists."),
        DirectoryError::Backend(msg) => json_error(StatusCode::INTERNAL_SERVER_ERROR, "directory_error", msg),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn json_ok(status: StatusCode, data: impl serde::Serialize) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "success": true,
            "data": data,
        })),
    )
        .into_response()
}
