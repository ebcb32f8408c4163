use claimdesk_auth::{Identity, RoleCode};
use claimdesk_core::UserId;

/// Authenticated caller for a request.
///
/// Inserted by the auth middleware; absent only on optional endpoints called
/// without a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    identity: Identity,
}

impl CallerContext {
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }

    pub fn user_id(&self) -> UserId {
        self.identity.id
    }

    pub fn role_code(&self) -> &RoleCode {
        &self.identity.role_code
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}
