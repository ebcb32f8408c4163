//! Directory adapters: users, projects and employees.
//!
//! The lifecycle service consults projects through [`ProjectDirectory`] and
//! users through [`claimdesk_auth::UserDirectory`]; both are implemented by
//! the same adapters here.

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use claimdesk_auth::DirectoryError;
use claimdesk_core::ProjectId;
use claimdesk_directory::Project;

pub use in_memory::InMemoryDirectory;
pub use postgres::PostgresDirectory;

/// Read access to projects.
#[async_trait::async_trait]
pub trait ProjectDirectory: Send + Sync {
    /// Active project by id.
    async fn find_project(&self, id: ProjectId) -> Result<Option<Project>, DirectoryError>;
}

#[async_trait::async_trait]
impl<D> ProjectDirectory for Arc<D>
where
    D: ProjectDirectory + ?Sized,
{
    async fn find_project(&self, id: ProjectId) -> Result<Option<Project>, DirectoryError> {
        (**self).find_project(id).await
    }
}
