use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tracing::info;

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new()
        .route("/auth", get(current_user))
        .route("/auth/logout", post(logout))
}

pub async fn current_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
) -> axum::response::Response {
    match services.users.find_user(caller.user_id()).await {
        Ok(Some(user)) => errors::json_ok(StatusCode::OK, dto::UserProfile::from(user)),
        Ok(None) => errors::json_error(StatusCode::BAD_REQUEST, "not_found", "User info is not exists."),
        Err(e) => errors::directory_error_to_response(e),
    }
}

/// Bump the caller's token version, revoking every token issued so far.
pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
) -> axum::response::Response {
    match services.users.bump_token_version(caller.user_id()).await {
        Ok(version) => {
            info!(user_id = %caller.user_id(), token_version = version, "user logged out");
            errors::json_ok(StatusCode::OK, ())
        }
        Err(e) => errors::directory_error_to_response(e),
    }
}
