//! Typed read-model query objects for claim and claim-log search.
//!
//! A search is a [`ClaimFilter`] (or [`ClaimLogFilter`]) plus a page request.
//! Storage adapters evaluate the filter and perform the join/projection into
//! the denormalized rows below; services never see raw joins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use claimdesk_auth::{RoleCode, UserRecord};
use claimdesk_claims::{Claim, ClaimLog, ClaimStatus};
use claimdesk_core::{ClaimId, ClaimLogId, ProjectId, UserId};
use claimdesk_directory::{Employee, Project, ProjectStatus};

/// Claim search criteria. Unset fields do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimFilter {
    /// Case-insensitive substring match on `claim_name`.
    pub keyword: Option<String>,
    pub claim_status: Option<ClaimStatus>,
    /// Claims starting on or after this instant.
    pub claim_start_date: Option<DateTime<Utc>>,
    /// Claims ending on or before this instant.
    pub claim_end_date: Option<DateTime<Utc>>,
    pub user_id: Option<UserId>,
    pub approval_id: Option<UserId>,
    /// Include soft-deleted claims (active-only otherwise).
    #[serde(default)]
    pub include_deleted: bool,
}

impl ClaimFilter {
    /// Trimmed, non-empty keyword.
    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    /// Evaluate the filter against one claim (used by in-memory adapters).
    pub fn matches(&self, claim: &Claim) -> bool {
        if !self.include_deleted && claim.meta.is_deleted() {
            return false;
        }
        if let Some(keyword) = self.keyword() {
            if !claim
                .claim_name
                .to_lowercase()
                .contains(&keyword.to_lowercase())
            {
                return false;
            }
        }
        if self.claim_status.is_some_and(|s| s != claim.claim_status) {
            return false;
        }
        if self.claim_start_date.is_some_and(|d| claim.claim_start_date < d) {
            return false;
        }
        if self.claim_end_date.is_some_and(|d| claim.claim_end_date > d) {
            return false;
        }
        if self.user_id.is_some_and(|u| u != claim.user_id) {
            return false;
        }
        if self.approval_id.is_some_and(|u| u != claim.approval_id) {
            return false;
        }
        true
    }
}

/// Claim-log search criteria.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimLogFilter {
    pub claim_id: ClaimId,
    #[serde(default)]
    pub include_deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalInfo {
    pub id: UserId,
    pub user_name: String,
    pub email: String,
    pub role_code: RoleCode,
}

impl From<&UserRecord> for ApprovalInfo {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            user_name: user.user_name.clone(),
            email: user.email.clone(),
            role_code: user.role_code.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub id: ProjectId,
    pub project_code: String,
    pub project_name: String,
    pub project_status: ProjectStatus,
}

impl From<&Project> for ProjectInfo {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id,
            project_code: project.project_code.clone(),
            project_name: project.project_name.clone(),
            project_status: project.project_status,
        }
    }
}

/// Claim row joined with submitter, employee, approver and project data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimReadModel {
    pub id: ClaimId,
    pub staff_id: UserId,
    pub staff_name: Option<String>,
    pub staff_email: Option<String>,
    pub staff_role: Option<RoleCode>,
    pub employee_info: Option<Employee>,
    pub approval_info: Option<ApprovalInfo>,
    pub project_info: Option<ProjectInfo>,
    /// Submitter's job on the claim's project.
    pub role_in_project: Option<String>,
    pub claim_name: String,
    pub claim_status: ClaimStatus,
    pub claim_start_date: DateTime<Utc>,
    pub claim_end_date: DateTime<Utc>,
    pub total_work_time: f64,
    pub remarks: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClaimReadModel {
    pub fn assemble(
        claim: &Claim,
        staff: Option<&UserRecord>,
        employee: Option<&Employee>,
        approver: Option<&UserRecord>,
        project: Option<&Project>,
    ) -> Self {
        Self {
            id: claim.id,
            staff_id: claim.user_id,
            staff_name: staff.map(|u| u.user_name.clone()),
            staff_email: staff.map(|u| u.email.clone()),
            staff_role: staff.map(|u| u.role_code.clone()),
            employee_info: employee.cloned(),
            approval_info: approver.map(ApprovalInfo::from),
            project_info: project.map(ProjectInfo::from),
            role_in_project: project
                .and_then(|p| p.role_of(claim.user_id))
                .map(str::to_string),
            claim_name: claim.claim_name.clone(),
            claim_status: claim.claim_status,
            claim_start_date: claim.claim_start_date,
            claim_end_date: claim.claim_end_date,
            total_work_time: claim.total_work_time,
            remarks: claim.remarks.clone(),
            is_deleted: claim.meta.is_deleted(),
            created_at: claim.meta.created_at,
            updated_at: claim.meta.updated_at,
        }
    }
}

/// Claim-log row joined with the claim name and the acting user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimLogReadModel {
    pub id: ClaimLogId,
    pub claim_id: ClaimId,
    pub claim_name: Option<String>,
    /// Actor's user name.
    pub updated_by: Option<String>,
    pub updated_by_user_id: UserId,
    pub old_status: ClaimStatus,
    pub new_status: ClaimStatus,
    pub comment: Option<String>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClaimLogReadModel {
    pub fn assemble(log: &ClaimLog, claim: Option<&Claim>, actor: Option<&UserRecord>) -> Self {
        Self {
            id: log.id,
            claim_id: log.claim_id,
            claim_name: claim.map(|c| c.claim_name.clone()),
            updated_by: actor.map(|u| u.user_name.clone()),
            updated_by_user_id: log.user_id,
            old_status: log.old_status,
            new_status: log.new_status,
            comment: log.comment.clone(),
            is_deleted: log.meta.is_deleted(),
            created_at: log.meta.created_at,
            updated_at: log.meta.updated_at,
        }
    }
}
