use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use claimdesk_core::{
    ClaimId, DateRange, DomainError, DomainResult, Entity, ProjectId, RecordMeta, UserId,
};

use crate::ClaimStatus;

/// A timesheet claim awaiting (or past) approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    /// Submitter; fixed at creation.
    pub user_id: UserId,
    pub project_id: ProjectId,
    pub approval_id: UserId,
    pub claim_name: String,
    pub claim_status: ClaimStatus,
    pub claim_start_date: DateTime<Utc>,
    pub claim_end_date: DateTime<Utc>,
    pub total_work_time: f64,
    pub remarks: String,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

impl Entity for Claim {
    type Id = ClaimId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }
}

impl Claim {
    /// New draft owned by `owner`.
    ///
    /// Any status or owner carried by `input` is ignored.
    pub fn draft(id: ClaimId, owner: UserId, input: &ClaimInput, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: owner,
            project_id: input.project_id,
            approval_id: input.approval_id,
            claim_name: input.claim_name.trim().to_string(),
            claim_status: ClaimStatus::Draft,
            claim_start_date: input.claim_start_date,
            claim_end_date: input.claim_end_date,
            total_work_time: input.total_work_time,
            remarks: input.remarks.clone(),
            meta: RecordMeta::created(now),
        }
    }

    pub fn range(&self) -> DateRange {
        DateRange::spanning(self.claim_start_date, self.claim_end_date)
    }

    pub fn is_editable(&self) -> bool {
        self.claim_status.is_editable()
    }

    /// Overwrite the editable fields from `input`; status and owner stay.
    pub fn apply_changes(&mut self, input: &ClaimInput, now: DateTime<Utc>) {
        self.project_id = input.project_id;
        self.approval_id = input.approval_id;
        self.claim_name = input.claim_name.trim().to_string();
        self.claim_start_date = input.claim_start_date;
        self.claim_end_date = input.claim_end_date;
        self.total_work_time = input.total_work_time;
        self.remarks = input.remarks.clone();
        self.meta.touch(now);
    }
}

/// Client-supplied claim fields for create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimInput {
    pub project_id: ProjectId,
    pub approval_id: UserId,
    pub claim_name: String,
    pub claim_start_date: DateTime<Utc>,
    pub claim_end_date: DateTime<Utc>,
    #[serde(default)]
    pub total_work_time: f64,
    #[serde(default)]
    pub remarks: String,
    /// Accepted on the wire and ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_status: Option<ClaimStatus>,
    /// Accepted on the wire and ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

impl ClaimInput {
    /// Field-level checks; returns the validated date range.
    pub fn validate(&self) -> DomainResult<DateRange> {
        if self.claim_name.trim().is_empty() {
            return Err(DomainError::validation("claim_name is required"));
        }
        if !self.total_work_time.is_finite() || self.total_work_time < 0.0 {
            return Err(DomainError::validation(
                "total_work_time must be a non-negative number",
            ));
        }
        DateRange::new(self.claim_start_date, self.claim_end_date)
    }
}
