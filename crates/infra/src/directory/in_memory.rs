use std::collections::HashMap;
use std::sync::RwLock;

use claimdesk_auth::{DirectoryError, UserDirectory, UserRecord};
use claimdesk_core::{ProjectId, UserId};
use claimdesk_directory::{Employee, Project};

use super::ProjectDirectory;

/// In-memory users, projects and employees.
///
/// Intended for tests/dev. Also serves the in-memory claim store's joins.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    users: RwLock<HashMap<UserId, UserRecord>>,
    projects: RwLock<HashMap<ProjectId, Project>>,
    employees: RwLock<HashMap<UserId, Employee>>,
}

fn poisoned() -> DirectoryError {
    DirectoryError::Backend("lock poisoned".to_string())
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, user: UserRecord) -> Result<(), DirectoryError> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        users.insert(user.id, user);
        Ok(())
    }

    pub fn insert_project(&self, project: Project) -> Result<(), DirectoryError> {
        let mut projects = self.projects.write().map_err(|_| poisoned())?;
        projects.insert(project.id, project);
        Ok(())
    }

    pub fn insert_employee(&self, employee: Employee) -> Result<(), DirectoryError> {
        let mut employees = self.employees.write().map_err(|_| poisoned())?;
        employees.insert(employee.user_id, employee);
        Ok(())
    }

    /// Active user, for joins.
    pub fn user(&self, id: UserId) -> Option<UserRecord> {
        let users = self.users.read().ok()?;
        users.get(&id).filter(|u| !u.meta.is_deleted()).cloned()
    }

    /// Project regardless of lifecycle, for joins.
    pub fn project(&self, id: ProjectId) -> Option<Project> {
        let projects = self.projects.read().ok()?;
        projects.get(&id).cloned()
    }

    pub fn employee(&self, user_id: UserId) -> Option<Employee> {
        let employees = self.employees.read().ok()?;
        employees.get(&user_id).cloned()
    }
}

#[async_trait::async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn find_user(&self, id: UserId) -> Result<Option<UserRecord>, DirectoryError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.get(&id).filter(|u| !u.meta.is_deleted()).cloned())
    }

    async fn bump_token_version(&self, id: UserId) -> Result<u64, DirectoryError> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        let user = users
            .get_mut(&id)
            .filter(|u| !u.meta.is_deleted())
            .ok_or(DirectoryError::NotFound)?;
        user.token_version += 1;
        user.meta.touch(chrono::Utc::now());
        Ok(user.token_version)
    }
}

#[async_trait::async_trait]
impl ProjectDirectory for InMemoryDirectory {
    async fn find_project(&self, id: ProjectId) -> Result<Option<Project>, DirectoryError> {
        let projects = self.projects.read().map_err(|_| poisoned())?;
        Ok(projects.get(&id).filter(|p| !p.meta.is_deleted()).cloned())
    }
}
