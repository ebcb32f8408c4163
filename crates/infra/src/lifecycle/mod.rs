//! Claim lifecycle service: creation, editing and the status state machine.
//!
//! ## Status Transition Flow
//!
//! ```text
//! UpdateStatusInput
//!   ↓
//! 1. Load claim and the actor's stored user record
//!   ↓
//! 2. Rule check (ownership, self-review, no-op, matrix, role, reason)
//!   ↓
//! 3. Append claim log
//!   ↓
//! 4. Commit status (compare-and-set on the status read in step 1)
//! ```
//!
//! A failed log append leaves the claim untouched. A failed or lost commit
//! after a successful append leaves an audit row describing a transition that
//! never took effect; that case is reported with `error!` and surfaced as
//! [`ClaimError::Conflict`] or [`ClaimError::Persistence`].

mod error;
mod service;

pub use error::ClaimError;
pub use service::{ClaimLifecycleService, SearchScope, UpdateStatusInput};
