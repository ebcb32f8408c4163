//! Claim Entity Store boundary.
//!
//! Persistence and querying of claims and their audit records, with an
//! in-memory adapter for tests/dev and a Postgres adapter for deployments.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryClaimStore;
pub use postgres::PostgresClaimStore;
pub use r#trait::{ClaimLogStore, ClaimStore, StatusAck, StoreError};
