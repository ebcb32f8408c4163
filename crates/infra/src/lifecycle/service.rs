use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use claimdesk_auth::{Identity, RoleCode, UserDirectory, UserRecord};
use claimdesk_claims::{
    Claim, ClaimInput, ClaimStatus, NewClaimLog, TransitionRequest, check_transition,
};
use claimdesk_core::{ClaimId, DateRange, Entity, Page, PageRequest, UserId};

use crate::claim_store::{ClaimLogStore, ClaimStore};
use crate::directory::ProjectDirectory;
use crate::read_model::{ClaimFilter, ClaimLogReadModel, ClaimReadModel};
use crate::recorder::ClaimLogRecorder;

use super::ClaimError;

const APPROVER_ROLE_REQUIRED: &str =
    "You can only request approval from users who have the 'Approval' role.";
const APPROVER_IS_SELF: &str = "You cannot request approval for your own claim.";
const STATUS_RACE: &str = "Claim status was changed by another request, please reload and try again.";

/// Body of a status change request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStatusInput {
    pub claim_id: ClaimId,
    pub claim_status: ClaimStatus,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Which slice of claims a search runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    /// Caller-supplied filter as is.
    All,
    /// Only claims submitted by the caller.
    Claimer,
    /// Only claims assigned to the caller for approval.
    Approval,
    /// Only paid claims.
    Finance,
}

impl SearchScope {
    fn narrow(self, mut filter: ClaimFilter, actor: &Identity) -> ClaimFilter {
        match self {
            SearchScope::All => {}
            SearchScope::Claimer => filter.user_id = Some(actor.id),
            SearchScope::Approval => filter.approval_id = Some(actor.id),
            SearchScope::Finance => filter.claim_status = Some(ClaimStatus::Paid),
        }
        filter
    }
}

/// Orchestrates claim operations over injected stores and directories.
///
/// Holds no entity state between calls; the stores are the source of truth.
#[derive(Clone)]
pub struct ClaimLifecycleService {
    claims: Arc<dyn ClaimStore>,
    recorder: ClaimLogRecorder,
    users: Arc<dyn UserDirectory>,
    projects: Arc<dyn ProjectDirectory>,
}

impl ClaimLifecycleService {
    pub fn new(
        claims: Arc<dyn ClaimStore>,
        logs: Arc<dyn ClaimLogStore>,
        users: Arc<dyn UserDirectory>,
        projects: Arc<dyn ProjectDirectory>,
    ) -> Self {
        Self {
            claims,
            recorder: ClaimLogRecorder::new(logs),
            users,
            projects,
        }
    }

    /// Create a draft claim owned by `actor`.
    pub async fn create(
        &self,
        input: ClaimInput,
        actor: &Identity,
        now: DateTime<Utc>,
    ) -> Result<Claim, ClaimError> {
        let range = self.validate_input(&input, actor.id).await?;

        if let Some(existing) = self.claims.find_overlapping(actor.id, range, None).await? {
            warn!(actor = %actor.id, existing = %existing.id, reason = "date_range_conflict", "claim create refused");
            return Err(ClaimError::DateRangeConflict);
        }

        let claim = Claim::draft(ClaimId::new(), actor.id, &input, now);
        let created = self.claims.create(claim).await.inspect_err(|e| {
            error!(actor = %actor.id, error = %e, "failed to persist claim");
        })?;

        info!(claim_id = %created.id, actor = %actor.id, "claim created");
        Ok(created)
    }

    pub async fn get(&self, id: ClaimId) -> Result<Claim, ClaimError> {
        self.claims
            .find_by_id(id)
            .await?
            .ok_or_else(|| ClaimError::not_found("Claim request info"))
    }

    /// Edit a draft claim. Status and owner never change here.
    pub async fn update(
        &self,
        id: ClaimId,
        input: ClaimInput,
        actor: &Identity,
        now: DateTime<Utc>,
    ) -> Result<Claim, ClaimError> {
        let mut claim = self.get(id).await?;
        if !claim.is_editable() {
            warn!(claim_id = %id, actor = %actor.id, status = %claim.claim_status, reason = "invalid_state", "claim update refused");
            return Err(ClaimError::InvalidState);
        }

        let range = self.validate_input(&input, actor.id).await?;
        if input.approval_id == claim.user_id {
            return Err(ClaimError::InvalidApprover(APPROVER_IS_SELF.into()));
        }

        if let Some(existing) = self
            .claims
            .find_overlapping(claim.user_id, range, Some(claim.id))
            .await?
        {
            warn!(claim_id = %id, existing = %existing.id, reason = "date_range_conflict", "claim update refused");
            return Err(ClaimError::DateRangeConflict);
        }

        claim.apply_changes(&input, now);
        let updated = self.claims.update(claim).await.inspect_err(|e| {
            error!(claim_id = %id, error = %e, "failed to persist claim update");
        })?;

        info!(claim_id = %updated.id, actor = %actor.id, "claim updated");
        Ok(updated)
    }

    /// Run the transition protocol: check, log, then commit.
    pub async fn update_status(
        &self,
        input: UpdateStatusInput,
        actor: &Identity,
        now: DateTime<Utc>,
    ) -> Result<(), ClaimError> {
        let claim = self.get(input.claim_id).await?;
        let actor_record = self.active_user(actor.id).await?.ok_or_else(|| ClaimError::not_found("User info"))?;

        let from = claim.claim_status;
        let to = input.claim_status;
        check_transition(&TransitionRequest {
            claim: &claim,
            actor_id: actor.id,
            actor_role: &actor_record.role_code,
            new_status: to,
            comment: input.comment.as_deref(),
        })
        .inspect_err(|e| {
            warn!(claim_id = %claim.id, actor = %actor.id, %from, %to, reason = %e, "status transition refused");
        })?;

        let entry = NewClaimLog {
            claim_id: claim.id,
            actor_id: actor.id,
            old_status: from,
            new_status: to,
            comment: input.comment,
        };
        let log = self.recorder.append(entry, now).await.inspect_err(|e| {
            error!(claim_id = %claim.id, error = %e, "claim log append failed; status left unchanged");
        })?;

        match self.claims.update_status(claim.id, from, to, now).await {
            Ok(ack) if ack.matched => {
                info!(claim_id = %claim.id, actor = %actor.id, %from, %to, "claim status transitioned");
                Ok(())
            }
            Ok(_) => {
                error!(claim_id = %claim.id, log_id = %log.id, %from, %to, "claim log written but status commit lost a race");
                Err(ClaimError::Conflict(STATUS_RACE.into()))
            }
            Err(e) => {
                error!(claim_id = %claim.id, log_id = %log.id, %from, %to, error = %e, "claim log written but status commit failed");
                Err(e.into())
            }
        }
    }

    pub async fn search(
        &self,
        filter: ClaimFilter,
        page: PageRequest,
        scope: SearchScope,
        actor: &Identity,
    ) -> Result<Page<ClaimReadModel>, ClaimError> {
        page.validate()?;
        let filter = scope.narrow(filter, actor);
        let (items, total) = self.claims.search(&filter, page).await?;
        Ok(Page::new(items, total, page))
    }

    pub async fn claim_logs(
        &self,
        claim_id: Option<ClaimId>,
        page: PageRequest,
    ) -> Result<Page<ClaimLogReadModel>, ClaimError> {
        self.recorder.list_for_claim(claim_id, page).await
    }

    /// Range, field, project, approver and membership checks shared by create and update.
    async fn validate_input(&self, input: &ClaimInput, actor_id: UserId) -> Result<DateRange, ClaimError> {
        let range = DateRange::new(input.claim_start_date, input.claim_end_date)
            .map_err(|e| ClaimError::InvalidRange(e.message().to_string()))?;
        input.validate()?;

        let project = self
            .projects
            .find_project(input.project_id)
            .await?
            .ok_or_else(|| ClaimError::not_found("Project info"))?;

        let approver = self.active_user(input.approval_id).await?;
        if !approver.is_some_and(|u| u.role_code == RoleCode::APPROVAL) {
            return Err(ClaimError::InvalidApprover(APPROVER_ROLE_REQUIRED.into()));
        }
        if input.approval_id == actor_id {
            return Err(ClaimError::InvalidApprover(APPROVER_IS_SELF.into()));
        }

        if !project.is_member(actor_id) {
            return Err(ClaimError::NotProjectMember);
        }

        Ok(range)
    }

    async fn active_user(&self, id: UserId) -> Result<Option<UserRecord>, ClaimError> {
        Ok(self.users.find_user(id).await?.filter(|u| u.is_active()))
    }
}
