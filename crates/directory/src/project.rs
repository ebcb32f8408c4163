use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use claimdesk_core::{Entity, ProjectId, RecordMeta, UserId};

/// Project status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ProjectStatus {
    #[default]
    New,
    Active,
    Pending,
    Closed,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::New => "New",
            ProjectStatus::Active => "Active",
            ProjectStatus::Pending => "Pending",
            ProjectStatus::Closed => "Closed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "New" => Some(ProjectStatus::New),
            "Active" => Some(ProjectStatus::Active),
            "Pending" => Some(ProjectStatus::Pending),
            "Closed" => Some(ProjectStatus::Closed),
            _ => None,
        }
    }
}

impl core::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's seat on a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMember {
    pub user_id: UserId,
    /// Job held on this project (`PM`, `DEV`, `QA`, ...).
    pub project_role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub project_code: String,
    pub project_name: String,
    pub project_status: ProjectStatus,
    pub project_start_date: Option<DateTime<Utc>>,
    pub project_end_date: Option<DateTime<Utc>>,
    pub project_members: Vec<ProjectMember>,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

impl Entity for Project {
    type Id = ProjectId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }
}

impl Project {
    pub fn member(&self, user_id: UserId) -> Option<&ProjectMember> {
        self.project_members.iter().find(|m| m.user_id == user_id)
    }

    pub fn is_member(&self, user_id: UserId) -> bool {
        self.member(user_id).is_some()
    }

    /// The user's job on this project, if they are a member.
    pub fn role_of(&self, user_id: UserId) -> Option<&str> {
        self.member(user_id).map(|m| m.project_role.as_str())
    }
}
