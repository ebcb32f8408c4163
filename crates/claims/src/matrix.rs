//! Permission matrix: legal (from, to) transitions and who may run them.

use claimdesk_auth::RoleCode;
use claimdesk_auth::roles::codes;

use crate::ClaimStatus;

/// Roles allowed to execute one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleSet(&'static [&'static str]);

impl RoleSet {
    pub fn contains(&self, role: &RoleCode) -> bool {
        self.0.contains(&role.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionPair {
    pub from: ClaimStatus,
    pub to: ClaimStatus,
    pub roles: RoleSet,
}

const SUBMITTERS: RoleSet = RoleSet(&[codes::FINANCE, codes::APPROVAL, codes::CLAIMER]);
const APPROVERS: RoleSet = RoleSet(&[codes::APPROVAL]);
const PAYERS: RoleSet = RoleSet(&[codes::FINANCE]);

pub const PERMISSION_PAIRS: [PermissionPair; 6] = [
    PermissionPair {
        from: ClaimStatus::Draft,
        to: ClaimStatus::PendingApproval,
        roles: SUBMITTERS,
    },
    PermissionPair {
        from: ClaimStatus::Draft,
        to: ClaimStatus::Canceled,
        roles: SUBMITTERS,
    },
    PermissionPair {
        from: ClaimStatus::PendingApproval,
        to: ClaimStatus::Draft,
        roles: APPROVERS,
    },
    PermissionPair {
        from: ClaimStatus::PendingApproval,
        to: ClaimStatus::Approved,
        roles: APPROVERS,
    },
    PermissionPair {
        from: ClaimStatus::PendingApproval,
        to: ClaimStatus::Rejected,
        roles: APPROVERS,
    },
    PermissionPair {
        from: ClaimStatus::Approved,
        to: ClaimStatus::Paid,
        roles: PAYERS,
    },
];

/// Allowed roles for `from -> to`, or `None` when the move is never legal.
pub fn find_transition(from: ClaimStatus, to: ClaimStatus) -> Option<RoleSet> {
    PERMISSION_PAIRS
        .iter()
        .find(|p| p.from == from && p.to == to)
        .map(|p| p.roles)
}
