//! Claim log recorder: the audit trail of status transitions.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use claimdesk_claims::{ClaimLog, NewClaimLog};
use claimdesk_core::{ClaimId, ClaimLogId, Page, PageRequest};

use crate::claim_store::{ClaimLogStore, StoreError};
use crate::lifecycle::ClaimError;
use crate::read_model::{ClaimLogFilter, ClaimLogReadModel};

/// Thin wrapper over a [`ClaimLogStore`] that stamps ids and timestamps.
#[derive(Clone)]
pub struct ClaimLogRecorder {
    store: Arc<dyn ClaimLogStore>,
}

impl ClaimLogRecorder {
    pub fn new(store: Arc<dyn ClaimLogStore>) -> Self {
        Self { store }
    }

    pub async fn append(&self, entry: NewClaimLog, now: DateTime<Utc>) -> Result<ClaimLog, StoreError> {
        let record = entry.into_record(ClaimLogId::new(), now);
        debug!(claim_id = %record.claim_id, log_id = %record.id, "appending claim log");
        self.store.append(record).await
    }

    /// Logs for one claim, most recent first.
    pub async fn list_for_claim(
        &self,
        claim_id: Option<ClaimId>,
        page: PageRequest,
    ) -> Result<Page<ClaimLogReadModel>, ClaimError> {
        let claim_id = claim_id.ok_or_else(|| ClaimError::Validation("Claim ID is required".into()))?;
        page.validate()?;

        let filter = ClaimLogFilter {
            claim_id,
            include_deleted: false,
        };
        let (items, total) = self.store.list_for_claim(&filter, page).await?;
        Ok(Page::new(items, total, page))
    }
}
