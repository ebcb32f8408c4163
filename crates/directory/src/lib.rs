//! Directory module (projects and employees).
//!
//! Plain records the claim workflow consults: project existence, project
//! membership and per-user employee display data. No IO here; adapters live
//! in infra.

pub mod employee;
pub mod project;

pub use employee::Employee;
pub use project::{Project, ProjectMember, ProjectStatus};
