//! Infrastructure layer: storage adapters, directories and the claim services.

pub mod claim_store;
pub mod directory;
pub mod lifecycle;
pub mod read_model;
pub mod recorder;
pub mod schema;

mod integration_tests;

pub use claim_store::{ClaimLogStore, ClaimStore, InMemoryClaimStore, PostgresClaimStore, StoreError};
pub use directory::{InMemoryDirectory, PostgresDirectory, ProjectDirectory};
pub use lifecycle::{ClaimError, ClaimLifecycleService, SearchScope, UpdateStatusInput};
pub use recorder::ClaimLogRecorder;
