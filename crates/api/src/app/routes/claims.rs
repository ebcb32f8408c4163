use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;

use claimdesk_claims::ClaimInput;
use claimdesk_infra::{SearchScope, UpdateStatusInput};

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::CallerContext;

/// Claim routes open to any authenticated caller.
pub fn router() -> Router {
    Router::new()
        .route("/claims", post(create_claim))
        .route("/claims/search", post(search_claims))
        .route("/claims/claimer-search", post(claimer_search))
        .route("/claims/change-status", put(change_status))
        .route("/claims/:id", get(get_claim).put(update_claim))
}

/// Requires the Approval role.
pub fn approval_router() -> Router {
    Router::new().route("/claims/approval-search", post(approval_search))
}

/// Requires the Admin or Finance role.
pub fn finance_router() -> Router {
    Router::new().route("/claims/finance-search", post(finance_search))
}

pub async fn create_claim(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    body: Result<Json<ClaimInput>, JsonRejection>,
) -> axum::response::Response {
    let input = match dto::read_json(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    match services.claims.create(input, caller.identity(), Utc::now()).await {
        Ok(claim) => errors::json_ok(StatusCode::CREATED, claim),
        Err(e) => errors::claim_error_to_response(e),
    }
}

pub async fn get_claim(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match dto::parse_claim_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.claims.get(id).await {
        Ok(claim) => errors::json_ok(StatusCode::OK, claim),
        Err(e) => errors::claim_error_to_response(e),
    }
}

pub async fn update_claim(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
    body: Result<Json<ClaimInput>, JsonRejection>,
) -> axum::response::Response {
    let id = match dto::parse_claim_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let input = match dto::read_json(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    match services.claims.update(id, input, caller.identity(), Utc::now()).await {
        Ok(claim) => errors::json_ok(StatusCode::OK, claim),
        Err(e) => errors::claim_error_to_response(e),
    }
}

pub async fn change_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    body: Result<Json<UpdateStatusInput>, JsonRejection>,
) -> axum::response::Response {
    let input = match dto::read_json(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    match services
        .claims
        .update_status(input, caller.identity(), Utc::now())
        .await
    {
        Ok(()) => errors::json_ok(StatusCode::OK, ()),
        Err(e) => errors::claim_error_to_response(e),
    }
}

pub async fn search_claims(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    body: Result<Json<dto::ClaimSearchRequest>, JsonRejection>,
) -> axum::response::Response {
    run_search(&services, &caller, body, SearchScope::All).await
}

pub async fn claimer_search(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    body: Result<Json<dto::ClaimSearchRequest>, JsonRejection>,
) -> axum::response::Response {
    run_search(&services, &caller, body, SearchScope::Claimer).await
}

pub async fn approval_search(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    body: Result<Json<dto::ClaimSearchRequest>, JsonRejection>,
) -> axum::response::Response {
    run_search(&services, &caller, body, SearchScope::Approval).await
}

pub async fn finance_search(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    body: Result<Json<dto::ClaimSearchRequest>, JsonRejection>,
) -> axum::response::Response {
    run_search(&services, &caller, body, SearchScope::Finance).await
}

async fn run_search(
    services: &AppServices,
    caller: &CallerContext,
    body: Result<Json<dto::ClaimSearchRequest>, JsonRejection>,
    scope: SearchScope,
) -> axum::response::Response {
    let body = match dto::read_json(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let filter = match body.search_condition.into_filter() {
        Ok(f) => f,
        Err(resp) => return resp,
    };

    match services
        .claims
        .search(filter, body.page_info, scope, caller.identity())
        .await
    {
        Ok(page) => errors::json_ok(StatusCode::OK, page),
        Err(e) => errors::claim_error_to_response(e),
    }
}
