//! Claims domain module (timesheet claims and their approval workflow).
//!
//! This crate holds the claim state machine as deterministic domain logic:
//! statuses, the permission matrix, claim and claim-log records, input
//! validation and the transition rule check. No IO, no HTTP, no storage.

pub mod claim;
pub mod log;
pub mod matrix;
pub mod status;
pub mod transition;

pub use claim::{Claim, ClaimInput};
pub use log::{ClaimLog, NewClaimLog};
pub use matrix::{PERMISSION_PAIRS, PermissionPair, RoleSet, find_transition};
pub use status::ClaimStatus;
pub use transition::{TransitionError, TransitionRequest, check_transition};
