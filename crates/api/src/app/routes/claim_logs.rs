use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    routing::post,
    Json, Router,
};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/claim-logs/search", post(search_claim_logs))
}

pub async fn search_claim_logs(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::ClaimLogSearchRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match dto::read_json(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    match services
        .claims
        .claim_logs(body.search_condition.claim_id, body.page_info)
        .await
    {
        Ok(page) => errors::json_ok(StatusCode::OK, page),
        Err(e) => errors::claim_error_to_response(e),
    }
}
