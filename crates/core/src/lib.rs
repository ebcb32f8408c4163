//! `claimdesk-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod pagination;
pub mod value_object;

pub use entity::{Entity, Lifecycle, RecordMeta};
pub use error::{DomainError, DomainResult};
pub use id::{ClaimId, ClaimLogId, ProjectId, UserId};
pub use pagination::{Page, PageInfo, PageRequest};
pub use value_object::{DateRange, ValueObject};
