use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use claimdesk_claims::{Claim, ClaimLog, ClaimStatus};
use claimdesk_core::{ClaimId, DateRange, PageRequest, UserId};

use crate::read_model::{ClaimFilter, ClaimLogFilter, ClaimLogReadModel, ClaimReadModel};

/// Claim store operation error.
///
/// These are **infrastructure errors** (storage faults, uniqueness) as
/// opposed to business-rule failures, which the lifecycle service raises.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Unique constraint violated; storage is the authoritative guard.
    #[error("duplicate record: {0}")]
    Duplicate(String),

    #[error("record not found: {0}")]
    NotFound(String),

    /// The claim left `Draft` before the edit was written.
    #[error("record no longer editable: {0}")]
    NotEditable(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Outcome of a conditional status write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusAck {
    /// Whether a row with the expected status was found and updated.
    pub matched: bool,
}

/// Persistence for claim records.
///
/// Reads exclude soft-deleted claims unless a filter explicitly asks for them.
#[async_trait::async_trait]
pub trait ClaimStore: Send + Sync {
    async fn create(&self, claim: Claim) -> Result<Claim, StoreError>;

    async fn find_by_id(&self, id: ClaimId) -> Result<Option<Claim>, StoreError>;

    /// Any non-canceled claim of `user_id` whose `[start, end)` intersects `range`,
    /// ignoring `exclude` when given.
    async fn find_overlapping(
        &self,
        user_id: UserId,
        range: DateRange,
        exclude: Option<ClaimId>,
    ) -> Result<Option<Claim>, StoreError>;

    /// Persist edited fields of an existing claim, only while it is still `Draft`.
    async fn update(&self, claim: Claim) -> Result<Claim, StoreError>;

    /// Set `claim_status` and `updated_at`, only if the stored status is still `expected`.
    ///
    /// Does not check transition legality.
    async fn update_status(
        &self,
        id: ClaimId,
        expected: ClaimStatus,
        new_status: ClaimStatus,
        now: DateTime<Utc>,
    ) -> Result<StatusAck, StoreError>;

    /// Filtered, joined page of claims, most recently updated first, plus the total count.
    async fn search(
        &self,
        filter: &ClaimFilter,
        page: PageRequest,
    ) -> Result<(Vec<ClaimReadModel>, u64), StoreError>;
}

/// Append-only persistence for claim audit records.
#[async_trait::async_trait]
pub trait ClaimLogStore: Send + Sync {
    async fn append(&self, log: ClaimLog) -> Result<ClaimLog, StoreError>;

    /// Logs for one claim, most recent first, plus the total count.
    async fn list_for_claim(
        &self,
        filter: &ClaimLogFilter,
        page: PageRequest,
    ) -> Result<(Vec<ClaimLogReadModel>, u64), StoreError>;
}

#[async_trait::async_trait]
impl<S> ClaimStore for Arc<S>
where
    S: ClaimStore + ?Sized,
{
    async fn create(&self, claim: Claim) -> Result<Claim, StoreError> {
        (**self).create(claim).await
    }

    async fn find_by_id(&self, id: ClaimId) -> Result<Option<Claim>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn find_overlapping(
        &self,
        user_id: UserId,
        range: DateRange,
        exclude: Option<ClaimId>,
    ) -> Result<Option<Claim>, StoreError> {
        (**self).find_overlapping(user_id, range, exclude).await
    }

    async fn update(&self, claim: Claim) -> Result<Claim, StoreError> {
        (**self).update(claim).await
    }

    async fn update_status(
        &self,
        id: ClaimId,
        expected: ClaimStatus,
        new_status: ClaimStatus,
        now: DateTime<Utc>,
    ) -> Result<StatusAck, StoreError> {
        (**self).update_status(id, expected, new_status, now).await
    }

    async fn search(
        &self,
        filter: &ClaimFilter,
        page: PageRequest,
    ) -> Result<(Vec<ClaimReadModel>, u64), StoreError> {
        (**self).search(filter, page).await
    }
}

#[async_trait::async_trait]
impl<S> ClaimLogStore for Arc<S>
where
    S: ClaimLogStore + ?Sized,
{
    async fn append(&self, log: ClaimLog) -> Result<ClaimLog, StoreError> {
        (**self).append(log).await
    }

    async fn list_for_claim(
        &self,
        filter: &ClaimLogFilter,
        page: PageRequest,
    ) -> Result<(Vec<ClaimLogReadModel>, u64), StoreError> {
        (**self).list_for_claim(filter, page).await
    }
}
