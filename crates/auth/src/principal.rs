use serde::{Deserialize, Serialize};

use claimdesk_core::UserId;

use crate::RoleCode;

/// Authenticated caller, as resolved by the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub role_code: RoleCode,
    pub token_version: u64,
}

impl Identity {
    pub fn has_role(&self, role: &RoleCode) -> bool {
        &self.role_code == role
    }

    pub fn has_any_role(&self, roles: &[RoleCode]) -> bool {
        roles.iter().any(|r| self.has_role(r))
    }
}
