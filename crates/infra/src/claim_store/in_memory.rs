use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use claimdesk_claims::{Claim, ClaimLog, ClaimStatus};
use claimdesk_core::{ClaimId, DateRange, PageRequest, UserId};

use crate::directory::InMemoryDirectory;
use crate::read_model::{ClaimFilter, ClaimLogFilter, ClaimLogReadModel, ClaimReadModel};

use super::r#trait::{ClaimLogStore, ClaimStore, StatusAck, StoreError};

/// In-memory claim and claim-log store.
///
/// Intended for tests/dev. Joins are resolved against an [`InMemoryDirectory`].
#[derive(Debug)]
pub struct InMemoryClaimStore {
    claims: RwLock<HashMap<ClaimId, Claim>>,
    logs: RwLock<Vec<ClaimLog>>,
    directory: Arc<InMemoryDirectory>,
}

fn poisoned() -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

fn page_slice<T>(items: Vec<T>, page: PageRequest) -> Vec<T> {
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
    items.into_iter().skip(offset).take(limit).collect()
}

impl InMemoryClaimStore {
    pub fn new(directory: Arc<InMemoryDirectory>) -> Self {
        Self {
            claims: RwLock::new(HashMap::new()),
            logs: RwLock::new(Vec::new()),
            directory,
        }
    }

    fn join(&self, claim: &Claim) -> ClaimReadModel {
        let staff = self.directory.user(claim.user_id);
        let employee = self.directory.employee(claim.user_id);
        let approver = self.directory.user(claim.approval_id);
        let project = self.directory.project(claim.project_id);
        ClaimReadModel::assemble(
            claim,
            staff.as_ref(),
            employee.as_ref(),
            approver.as_ref(),
            project.as_ref(),
        )
    }
}

#[async_trait::async_trait]
impl ClaimStore for InMemoryClaimStore {
    async fn create(&self, claim: Claim) -> Result<Claim, StoreError> {
        let mut claims = self.claims.write().map_err(|_| poisoned())?;
        if claims.contains_key(&claim.id) {
            return Err(StoreError::Duplicate(format!("claim {}", claim.id)));
        }
        claims.insert(claim.id, claim.clone());
        Ok(claim)
    }

    async fn find_by_id(&self, id: ClaimId) -> Result<Option<Claim>, StoreError> {
        let claims = self.claims.read().map_err(|_| poisoned())?;
        Ok(claims.get(&id).filter(|c| !c.meta.is_deleted()).cloned())
    }

    async fn find_overlapping(
        &self,
        user_id: UserId,
        range: DateRange,
        exclude: Option<ClaimId>,
    ) -> Result<Option<Claim>, StoreError> {
        let claims = self.claims.read().map_err(|_| poisoned())?;
        Ok(claims
            .values()
            .filter(|c| c.user_id == user_id)
            .filter(|c| c.claim_status != ClaimStatus::Canceled)
            .filter(|c| !c.meta.is_deleted())
            .filter(|c| Some(c.id) != exclude)
            .filter(|c| c.range().overlaps(&range))
            .min_by_key(|c| (c.claim_start_date, c.id))
            .cloned())
    }

    async fn update(&self, claim: Claim) -> Result<Claim, StoreError> {
        let mut claims = self.claims.write().map_err(|_| poisoned())?;
        match claims.get_mut(&claim.id) {
            Some(existing) if !existing.meta.is_deleted() => {
                if existing.claim_status != ClaimStatus::Draft {
                    return Err(StoreError::NotEditable(format!(
                        "claim {} is {}",
                        claim.id, existing.claim_status
                    )));
                }
                // Status moves only through update_status.
                *existing = claim;
                existing.claim_status = ClaimStatus::Draft;
                Ok(existing.clone())
            }
            _ => Err(StoreError::NotFound(format!("claim {}", claim.id))),
        }
    }

    async fn update_status(
        &self,
        id: ClaimId,
        expected: ClaimStatus,
        new_status: ClaimStatus,
        now: DateTime<Utc>,
    ) -> Result<StatusAck, StoreError> {
        let mut claims = self.claims.write().map_err(|_| poisoned())?;
        let Some(claim) = claims
            .get_mut(&id)
            .filter(|c| !c.meta.is_deleted() && c.claim_status == expected)
        else {
            return Ok(StatusAck { matched: false });
        };
        claim.claim_status = new_status;
        claim.meta.touch(now);
        Ok(StatusAck { matched: true })
    }

    async fn search(
        &self,
        filter: &ClaimFilter,
        page: PageRequest,
    ) -> Result<(Vec<ClaimReadModel>, u64), StoreError> {
        let mut matched: Vec<Claim> = {
            let claims = self.claims.read().map_err(|_| poisoned())?;
            claims.values().filter(|c| filter.matches(c)).cloned().collect()
        };
        matched.sort_by_key(|c| Reverse((c.meta.updated_at, c.meta.created_at, c.id)));

        let total = matched.len() as u64;
        let rows = page_slice(matched, page).iter().map(|c| self.join(c)).collect();
        Ok((rows, total))
    }
}

#[async_trait::async_trait]
impl ClaimLogStore for InMemoryClaimStore {
    async fn append(&self, log: ClaimLog) -> Result<ClaimLog, StoreError> {
        let mut logs = self.logs.write().map_err(|_| poisoned())?;
        if logs.iter().any(|l| l.id == log.id) {
            return Err(StoreError::Duplicate(format!("claim log {}", log.id)));
        }
        logs.push(log.clone());
        Ok(log)
    }

    async fn list_for_claim(
        &self,
        filter: &ClaimLogFilter,
        page: PageRequest,
    ) -> Result<(Vec<ClaimLogReadModel>, u64), StoreError> {
        let mut matched: Vec<ClaimLog> = {
            let logs = self.logs.read().map_err(|_| poisoned())?;
            logs.iter()
                .filter(|l| l.claim_id == filter.claim_id)
                .filter(|l| filter.include_deleted || !l.meta.is_deleted())
                .cloned()
                .collect()
        };
        matched.sort_by_key(|l| Reverse((l.meta.created_at, l.id)));

        let total = matched.len() as u64;
        let claim = {
            let claims = self.claims.read().map_err(|_| poisoned())?;
            claims.get(&filter.claim_id).cloned()
        };
        let rows = page_slice(matched, page)
            .iter()
            .map(|l| {
                let actor = self.directory.user(l.user_id);
                ClaimLogReadModel::assemble(l, claim.as_ref(), actor.as_ref())
            })
            .collect();
        Ok((rows, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use claimdesk_core::{ProjectId, RecordMeta};

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, d, 0, 0, 0).unwrap()
    }

    fn claim(user: UserId, start: u32, end: u32, status: ClaimStatus) -> Claim {
        Claim {
            id: ClaimId::new(),
            user_id: user,
            project_id: ProjectId::new(),
            approval_id: UserId::new(),
            claim_name: format!("claim {start}-{end}"),
            claim_status: status,
            claim_start_date: day(start),
            claim_end_date: day(end),
            total_work_time: 8.0,
            remarks: String::new(),
            meta: RecordMeta::created(day(start)),
        }
    }

    fn store() -> InMemoryClaimStore {
        InMemoryClaimStore::new(Arc::new(InMemoryDirectory::new()))
    }

    #[tokio::test]
    async fn overlap_ignores_touching_canceled_and_excluded() {
        let s = store();
        let user = UserId::new();
        let existing = s.create(claim(user, 4, 6, ClaimStatus::Draft)).await.unwrap();
        s.create(claim(user, 10, 12, ClaimStatus::Canceled)).await.unwrap();

        let touching = DateRange::new(day(2), day(4)).unwrap();
        assert!(s.find_overlapping(user, touching, None).await.unwrap().is_none());

        let over_canceled = DateRange::new(day(10), day(11)).unwrap();
        assert!(s.find_overlapping(user, over_canceled, None).await.unwrap().is_none());

        let inside = DateRange::new(day(5), day(7)).unwrap();
        let hit = s.find_overlapping(user, inside, None).await.unwrap().unwrap();
        assert_eq!(hit.id, existing.id);
        assert!(
            s.find_overlapping(user, inside, Some(existing.id))
                .await
                .unwrap()
                .is_none()
        );

        let other_user = UserId::new();
        assert!(s.find_overlapping(other_user, inside, None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_status_is_compare_and_set() {
        let s = store();
        let c = s.create(claim(UserId::new(), 1, 2, ClaimStatus::Draft)).await.unwrap();

        let ack = s
            .update_status(c.id, ClaimStatus::Draft, ClaimStatus::PendingApproval, day(3))
            .await
            .unwrap();
        assert!(ack.matched);

        let stale = s
            .update_status(c.id, ClaimStatus::Draft, ClaimStatus::Canceled, day(3))
            .await
            .unwrap();
        assert!(!stale.matched);

        let stored = s.find_by_id(c.id).await.unwrap().unwrap();
        assert_eq!(stored.claim_status, ClaimStatus::PendingApproval);
        assert_eq!(stored.meta.updated_at, day(3));
    }

    #[tokio::test]
    async fn update_refuses_claim_that_left_draft() {
        let s = store();
        let c = s.create(claim(UserId::new(), 1, 2, ClaimStatus::Draft)).await.unwrap();
        s.update_status(c.id, ClaimStatus::Draft, ClaimStatus::PendingApproval, day(3))
            .await
            .unwrap();

        let mut edited = c.clone();
        edited.claim_name = "renamed".into();
        let err = s.update(edited).await.unwrap_err();
        assert!(matches!(err, StoreError::NotEditable(_)));

        let stored = s.find_by_id(c.id).await.unwrap().unwrap();
        assert_eq!(stored.claim_name, c.claim_name);
        assert_eq!(stored.claim_status, ClaimStatus::PendingApproval);
    }

    #[tokio::test]
    async fn search_pages_most_recently_updated_first() {
        let s = store();
        let user = UserId::new();
        for d in [1, 5, 9] {
            s.create(claim(user, d, d + 1, ClaimStatus::Draft)).await.unwrap();
        }

        let (rows, total) = s
            .search(&ClaimFilter::default(), PageRequest::new(1, 2).unwrap())
            .await
            .unwrap();
        assert_eq!(total, 3);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].claim_start_date, day(9));
        assert_eq!(rows[1].claim_start_date, day(5));

        let (rest, _) = s
            .search(&ClaimFilter::default(), PageRequest::new(2, 2).unwrap())
            .await
            .unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].claim_start_date, day(1));
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected() {
        let s = store();
        let c = claim(UserId::new(), 1, 2, ClaimStatus::Draft);
        s.create(c.clone()).await.unwrap();
        assert!(matches!(s.create(c).await, Err(StoreError::Duplicate(_))));
    }
}
