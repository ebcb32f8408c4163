use axum::{extract::Extension, http::StatusCode};

use crate::app::errors;
use crate::context::CallerContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(caller): Extension<CallerContext>) -> axum::response::Response {
    errors::json_ok(StatusCode::OK, caller.identity())
}
