use std::sync::Arc;

use axum::{routing::get, Router};

use claimdesk_auth::{AccessRequirement, AuthGate, RoleCode};

use crate::middleware::{self, AuthState};

pub mod auth;
pub mod claim_logs;
pub mod claims;
pub mod system;

/// Router for all authenticated endpoints, each behind its role requirement.
pub fn router(gate: Arc<AuthGate>) -> Router {
    let authenticated = Router::new()
        .merge(claims::router())
        .merge(claim_logs::router())
        .merge(auth::router())
        .route("/whoami", get(system::whoami));

    guarded(authenticated, &gate, AccessRequirement::authenticated())
        .merge(guarded(
            claims::approval_router(),
            &gate,
            AccessRequirement::roles([RoleCode::APPROVAL]),
        ))
        .merge(guarded(
            claims::finance_router(),
            &gate,
            AccessRequirement::roles([RoleCode::ADMIN, RoleCode::FINANCE]),
        ))
}

fn guarded(router: Router, gate: &Arc<AuthGate>, requirement: AccessRequirement) -> Router {
    let state = AuthState {
        gate: gate.clone(),
        requirement,
    };
    router.route_layer(axum::middleware::from_fn_with_state(
        state,
        middleware::auth_middleware,
    ))
}
