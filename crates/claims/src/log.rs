use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use claimdesk_core::{ClaimId, ClaimLogId, Entity, RecordMeta, UserId};

use crate::ClaimStatus;

/// Immutable audit record of one status transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimLog {
    pub id: ClaimLogId,
    pub claim_id: ClaimId,
    /// Actor who triggered the transition.
    pub user_id: UserId,
    pub old_status: ClaimStatus,
    pub new_status: ClaimStatus,
    pub comment: Option<String>,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

impl Entity for ClaimLog {
    type Id = ClaimLogId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }
}

/// A transition about to be recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClaimLog {
    pub claim_id: ClaimId,
    pub actor_id: UserId,
    pub old_status: ClaimStatus,
    pub new_status: ClaimStatus,
    pub comment: Option<String>,
}

impl NewClaimLog {
    pub fn into_record(self, id: ClaimLogId, now: DateTime<Utc>) -> ClaimLog {
        ClaimLog {
            id,
            claim_id: self.claim_id,
            user_id: self.actor_id,
            old_status: self.old_status,
            new_status: self.new_status,
            comment: self.comment.filter(|c| !c.trim().is_empty()),
            meta: RecordMeta::created(now),
        }
    }
}
