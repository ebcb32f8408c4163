//! Integration tests for the claim lifecycle over in-memory adapters.
//!
//! Tests: ClaimLifecycleService → ClaimStore / ClaimLogStore → read models
//!
//! Verifies:
//! - Overlap detection with half-open ranges
//! - Transition rules and the log-then-commit ordering
//! - Failure injection on the log append and the status commit

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, TimeZone, Utc};

    use claimdesk_auth::{Identity, RoleCode, UserRecord};
    use claimdesk_claims::{Claim, ClaimInput, ClaimLog, ClaimStatus};
    use claimdesk_core::{ClaimId, DateRange, PageRequest, ProjectId, RecordMeta, UserId};
    use claimdesk_directory::{Employee, Project, ProjectMember, ProjectStatus};

    use crate::claim_store::{ClaimLogStore, ClaimStore, InMemoryClaimStore, StatusAck, StoreError};
    use crate::directory::InMemoryDirectory;
    use crate::lifecycle::{ClaimError, ClaimLifecycleService, SearchScope, UpdateStatusInput};
    use crate::read_model::{ClaimFilter, ClaimLogFilter, ClaimLogReadModel, ClaimReadModel};

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, d, 0, 0, 0).unwrap()
    }

    fn user(name: &str, role: RoleCode) -> UserRecord {
        UserRecord {
            id: UserId::new(),
            email: format!("{name}@example.com"),
            user_name: name.into(),
            role_code: role,
            is_verified: true,
            is_blocked: false,
            token_version: 0,
            meta: RecordMeta::created(day(1)),
        }
    }

    fn identity(u: &UserRecord) -> Identity {
        Identity {
            id: u.id,
            role_code: u.role_code.clone(),
            token_version: u.token_version,
        }
    }

    struct Fixture {
        directory: Arc<InMemoryDirectory>,
        store: Arc<InMemoryClaimStore>,
        service: ClaimLifecycleService,
        claimer: UserRecord,
        approver: UserRecord,
        finance: UserRecord,
        outsider: UserRecord,
        project: ProjectId,
    }

    impl Fixture {
        fn input(&self, start: u32, end: u32) -> ClaimInput {
            ClaimInput {
                project_id: self.project,
                approval_id: self.approver.id,
                claim_name: "Overtime".into(),
                claim_start_date: day(start),
                claim_end_date: day(end),
                total_work_time: 8.0,
                remarks: String::new(),
                claim_status: None,
                user_id: None,
            }
        }

        async fn create(&self, start: u32, end: u32) -> Result<Claim, ClaimError> {
            self.service
                .create(self.input(start, end), &identity(&self.claimer), day(1))
                .await
        }

        async fn transition(
            &self,
            claim: ClaimId,
            actor: &UserRecord,
            to: ClaimStatus,
            comment: Option<&str>,
        ) -> Result<(), ClaimError> {
            self.service
                .update_status(
                    UpdateStatusInput {
                        claim_id: claim,
                        claim_status: to,
                        comment: comment.map(str::to_string),
                    },
                    &identity(actor),
                    day(10),
                )
                .await
        }

        async fn logs(&self, claim: ClaimId) -> Vec<ClaimLogReadModel> {
            self.service
                .claim_logs(Some(claim), PageRequest::default())
                .await
                .unwrap()
                .page_data
        }

        async fn status(&self, claim: ClaimId) -> ClaimStatus {
            self.service.get(claim).await.unwrap().claim_status
        }
    }

    fn seed() -> (Arc<InMemoryDirectory>, UserRecord, UserRecord, UserRecord, UserRecord, ProjectId) {
        let directory = Arc::new(InMemoryDirectory::new());
        let claimer = user("claimer", RoleCode::CLAIMER);
        let approver = user("approver", RoleCode::APPROVAL);
        let finance = user("finance", RoleCode::FINANCE);
        let outsider = user("outsider", RoleCode::CLAIMER);
        for u in [&claimer, &approver, &finance, &outsider] {
            directory.insert_user(u.clone()).unwrap();
        }

        let project = Project {
            id: ProjectId::new(),
            project_code: "PRJ-1".into(),
            project_name: "Billing revamp".into(),
            project_status: ProjectStatus::Active,
            project_start_date: None,
            project_end_date: None,
            project_members: vec![
                ProjectMember {
                    user_id: claimer.id,
                    project_role: "Developer".into(),
                },
                ProjectMember {
                    user_id: approver.id,
                    project_role: "PM".into(),
                },
            ],
            meta: RecordMeta::created(day(1)),
        };
        let project_id = project.id;
        directory.insert_project(project).unwrap();
        directory
            .insert_employee(Employee {
                user_id: claimer.id,
                full_name: "Claire Mer".into(),
                job_rank: "Senior".into(),
                job_title: "Engineer".into(),
                department_name: "Delivery".into(),
            })
            .unwrap();

        (directory, claimer, approver, finance, outsider, project_id)
    }

    fn setup() -> Fixture {
        let (directory, claimer, approver, finance, outsider, project) = seed();
        let store = Arc::new(InMemoryClaimStore::new(directory.clone()));
        let service = ClaimLifecycleService::new(store.clone(), store.clone(), directory.clone(), directory.clone());
        Fixture {
            directory,
            store,
            service,
            claimer,
            approver,
            finance,
            outsider,
            project,
        }
    }

    // create / update

    #[tokio::test]
    async fn create_forces_draft_and_owner() {
        let fx = setup();
        let mut input = fx.input(1, 5);
        input.claim_status = Some(ClaimStatus::Paid);
        input.user_id = Some(fx.outsider.id);

        let claim = fx
            .service
            .create(input, &identity(&fx.claimer), day(1))
            .await
            .unwrap();
        assert_eq!(claim.claim_status, ClaimStatus::Draft);
        assert_eq!(claim.user_id, fx.claimer.id);
    }

    #[tokio::test]
    async fn overlapping_create_conflicts_but_touching_is_allowed() {
        let fx = setup();
        fx.create(1, 5).await.unwrap();

        assert_eq!(fx.create(3, 7).await.unwrap_err(), ClaimError::DateRangeConflict);
        assert!(fx.create(5, 7).await.is_ok());
    }

    #[tokio::test]
    async fn canceled_claims_do_not_block_new_ranges() {
        let fx = setup();
        let a = fx.create(1, 5).await.unwrap();
        fx.transition(a.id, &fx.claimer, ClaimStatus::Canceled, None).await.unwrap();
        assert!(fx.create(2, 4).await.is_ok());
    }

    #[tokio::test]
    async fn create_validates_range_project_approver_and_membership() {
        let fx = setup();
        let actor = identity(&fx.claimer);

        let err = fx.service.create(fx.input(5, 1), &actor, day(1)).await.unwrap_err();
        assert!(matches!(err, ClaimError::InvalidRange(_)));

        let mut missing_project = fx.input(1, 2);
        missing_project.project_id = ProjectId::new();
        let err = fx.service.create(missing_project, &actor, day(1)).await.unwrap_err();
        assert_eq!(err.to_string(), "Project info is not exists.");

        let mut wrong_role = fx.input(1, 2);
        wrong_role.approval_id = fx.finance.id;
        let err = fx.service.create(wrong_role, &actor, day(1)).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "You can only request approval from users who have the 'Approval' role."
        );

        let approver_actor = identity(&fx.approver);
        let err = fx.service.create(fx.input(1, 2), &approver_actor, day(1)).await.unwrap_err();
        assert_eq!(err.to_string(), "You cannot request approval for your own claim.");

        let err = fx
            .service
            .create(fx.input(1, 2), &identity(&fx.outsider), day(1))
            .await
            .unwrap_err();
        assert_eq!(err, ClaimError::NotProjectMember);
    }

    #[tokio::test]
    async fn update_only_applies_to_drafts() {
        let fx = setup();
        let claim = fx.create(1, 5).await.unwrap();
        fx.transition(claim.id, &fx.claimer, ClaimStatus::PendingApproval, None)
            .await
            .unwrap();

        let mut input = fx.input(1, 5);
        input.claim_name = "Renamed".into();
        let err = fx
            .service
            .update(claim.id, input, &identity(&fx.claimer), day(2))
            .await
            .unwrap_err();
        assert_eq!(err, ClaimError::InvalidState);
        assert_eq!(err.to_string(), "Only claim with status is draft can be updated.");

        let stored = fx.service.get(claim.id).await.unwrap();
        assert_eq!(stored.claim_name, "Overtime");
    }

    #[tokio::test]
    async fn update_excludes_itself_from_overlap_and_keeps_owner() {
        let fx = setup();
        let a = fx.create(1, 5).await.unwrap();
        fx.create(10, 12).await.unwrap();

        let mut input = fx.input(2, 6);
        input.user_id = Some(fx.outsider.id);
        input.claim_status = Some(ClaimStatus::Approved);
        let updated = fx
            .service
            .update(a.id, input, &identity(&fx.claimer), day(3))
            .await
            .unwrap();
        assert_eq!(updated.claim_start_date, day(2));
        assert_eq!(updated.user_id, fx.claimer.id);
        assert_eq!(updated.claim_status, ClaimStatus::Draft);

        let err = fx
            .service
            .update(a.id, fx.input(9, 11), &identity(&fx.claimer), day(4))
            .await
            .unwrap_err();
        assert_eq!(err, ClaimError::DateRangeConflict);
    }

    #[tokio::test]
    async fn missing_claim_is_reported_as_not_exists() {
        let fx = setup();
        let err = fx.service.get(ClaimId::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "Claim request info is not exists.");
    }

    // status transitions

    #[tokio::test]
    async fn approval_flow_records_each_step() {
        let fx = setup();
        let claim = fx.create(1, 5).await.unwrap();

        fx.transition(claim.id, &fx.claimer, ClaimStatus::PendingApproval, None)
            .await
            .unwrap();
        fx.transition(claim.id, &fx.approver, ClaimStatus::Approved, Some("ok"))
            .await
            .unwrap();
        assert_eq!(fx.status(claim.id).await, ClaimStatus::Approved);

        fx.transition(claim.id, &fx.finance, ClaimStatus::Paid, None).await.unwrap();
        assert_eq!(fx.status(claim.id).await, ClaimStatus::Paid);

        let logs = fx.logs(claim.id).await;
        assert_eq!(logs.len(), 3);
        let approve = logs
            .iter()
            .find(|l| l.new_status == ClaimStatus::Approved)
            .unwrap();
        assert_eq!(approve.old_status, ClaimStatus::PendingApproval);
        assert_eq!(approve.updated_by.as_deref(), Some("approver"));
        assert_eq!(approve.claim_name.as_deref(), Some("Overtime"));
        assert_eq!(approve.comment.as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn draft_to_rejected_is_illegal_regardless_of_comment() {
        let fx = setup();
        let claim = fx.create(1, 5).await.unwrap();
        let err = fx
            .transition(claim.id, &fx.approver, ClaimStatus::Rejected, Some("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimError::IllegalTransition(_)));

        let by_owner = fx
            .transition(claim.id, &fx.claimer, ClaimStatus::Rejected, Some("typo"))
            .await
            .unwrap_err();
        assert!(matches!(by_owner, ClaimError::IllegalTransition(_)));
        assert_eq!(fx.status(claim.id).await, ClaimStatus::Draft);
        assert!(fx.logs(claim.id).await.is_empty());
    }

    #[tokio::test]
    async fn only_owner_cancels_a_draft() {
        let fx = setup();
        let claim = fx.create(1, 5).await.unwrap();
        let err = fx
            .transition(claim.id, &fx.approver, ClaimStatus::Canceled, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimError::Forbidden(_)));
        assert_eq!(fx.status(claim.id).await, ClaimStatus::Draft);
    }

    #[tokio::test]
    async fn refused_transitions_leave_no_trace() {
        let fx = setup();
        let claim = fx.create(1, 5).await.unwrap();
        fx.transition(claim.id, &fx.claimer, ClaimStatus::PendingApproval, None)
            .await
            .unwrap();

        let noop = fx
            .transition(claim.id, &fx.claimer, ClaimStatus::PendingApproval, None)
            .await
            .unwrap_err();
        assert!(matches!(noop, ClaimError::NoOpTransition(_)));

        let no_reason = fx
            .transition(claim.id, &fx.approver, ClaimStatus::Rejected, Some("  "))
            .await
            .unwrap_err();
        assert!(matches!(no_reason, ClaimError::MissingReason(_)));

        let wrong_role = fx
            .transition(claim.id, &fx.finance, ClaimStatus::Approved, None)
            .await
            .unwrap_err();
        assert!(matches!(wrong_role, ClaimError::Unauthorized(_)));

        let not_in_matrix = fx
            .transition(claim.id, &fx.approver, ClaimStatus::Canceled, None)
            .await
            .unwrap_err();
        assert!(matches!(not_in_matrix, ClaimError::IllegalTransition(_)));

        assert_eq!(fx.status(claim.id).await, ClaimStatus::PendingApproval);
        assert_eq!(fx.logs(claim.id).await.len(), 1);
    }

    #[tokio::test]
    async fn approver_cannot_rule_on_own_claim() {
        let fx = setup();
        // An approver submitting their own claim, routed to a second approver.
        let second = user("second", RoleCode::APPROVAL);
        fx.directory.insert_user(second.clone()).unwrap();
        let mut project = fx.directory.project(fx.project).unwrap();
        project.project_members.push(ProjectMember {
            user_id: second.id,
            project_role: "QA".into(),
        });
        fx.directory.insert_project(project).unwrap();

        let mut input = fx.input(1, 5);
        input.approval_id = second.id;
        let claim = fx
            .service
            .create(input, &identity(&fx.approver), day(1))
            .await
            .unwrap();
        fx.transition(claim.id, &fx.approver, ClaimStatus::PendingApproval, None)
            .await
            .unwrap();

        let err = fx
            .transition(claim.id, &fx.approver, ClaimStatus::Approved, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimError::Forbidden(_)));
        assert!(fx.transition(claim.id, &second, ClaimStatus::Approved, None).await.is_ok());
    }

    #[tokio::test]
    async fn role_comes_from_stored_user_not_token() {
        let fx = setup();
        let claim = fx.create(1, 5).await.unwrap();
        fx.transition(claim.id, &fx.claimer, ClaimStatus::PendingApproval, None)
            .await
            .unwrap();

        let mut forged = identity(&fx.finance);
        forged.role_code = RoleCode::APPROVAL;
        let err = fx
            .service
            .update_status(
                UpdateStatusInput {
                    claim_id: claim.id,
                    claim_status: ClaimStatus::Approved,
                    comment: None,
                },
                &forged,
                day(3),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimError::Unauthorized(_)));
    }

    // search

    #[tokio::test]
    async fn scoped_searches_narrow_the_filter() {
        let fx = setup();
        let a = fx.create(1, 5).await.unwrap();
        fx.create(6, 8).await.unwrap();
        for (actor, to) in [
            (&fx.claimer, ClaimStatus::PendingApproval),
            (&fx.approver, ClaimStatus::Approved),
            (&fx.finance, ClaimStatus::Paid),
        ] {
            fx.transition(a.id, actor, to, None).await.unwrap();
        }

        let paid = fx
            .service
            .search(ClaimFilter::default(), PageRequest::default(), SearchScope::Finance, &identity(&fx.finance))
            .await
            .unwrap();
        assert_eq!(paid.page_info.total_items, 1);
        let row: &ClaimReadModel = &paid.page_data[0];
        assert_eq!(row.id, a.id);
        assert_eq!(row.role_in_project.as_deref(), Some("Developer"));
        assert_eq!(row.staff_name.as_deref(), Some("claimer"));
        assert_eq!(
            row.employee_info.as_ref().map(|e| e.full_name.as_str()),
            Some("Claire Mer")
        );
        assert_eq!(row.approval_info.as_ref().map(|a| a.id), Some(fx.approver.id));

        let mine = fx
            .service
            .search(ClaimFilter::default(), PageRequest::default(), SearchScope::Claimer, &identity(&fx.outsider))
            .await
            .unwrap();
        assert_eq!(mine.page_info.total_items, 0);
        assert_eq!(mine.page_info.total_pages, 0);

        let to_approve = fx
            .service
            .search(ClaimFilter::default(), PageRequest::default(), SearchScope::Approval, &identity(&fx.approver))
            .await
            .unwrap();
        assert_eq!(to_approve.page_info.total_items, 2);
    }

    #[tokio::test]
    async fn search_rejects_bad_paging_and_log_search_needs_claim_id() {
        let fx = setup();
        let err = fx
            .service
            .search(
                ClaimFilter::default(),
                PageRequest { page_num: 0, page_size: 10 },
                SearchScope::All,
                &identity(&fx.claimer),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimError::Validation(_)));

        let err = fx
            .service
            .claim_logs(None, PageRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err, ClaimError::Validation("Claim ID is required".into()));
    }

    // failure injection

    struct FailingLogs;

    #[async_trait::async_trait]
    impl ClaimLogStore for FailingLogs {
        async fn append(&self, _log: ClaimLog) -> Result<ClaimLog, StoreError> {
            Err(StoreError::Backend("log table unavailable".into()))
        }

        async fn list_for_claim(
            &self,
            _filter: &ClaimLogFilter,
            _page: PageRequest,
        ) -> Result<(Vec<ClaimLogReadModel>, u64), StoreError> {
            Ok((Vec::new(), 0))
        }
    }

    /// Delegates everything except the status commit, which reports `ack`.
    ///
    /// With `submit_before_edit`, a competing submission lands between the
    /// service's read and its field update.
    struct StaleCommit {
        inner: Arc<InMemoryClaimStore>,
        ack: Result<StatusAck, StoreError>,
        submit_before_edit: bool,
    }

    #[async_trait::async_trait]
    impl ClaimStore for StaleCommit {
        async fn create(&self, claim: Claim) -> Result<Claim, StoreError> {
            self.inner.create(claim).await
        }

        async fn find_by_id(&self, id: ClaimId) -> Result<Option<Claim>, StoreError> {
            self.inner.find_by_id(id).await
        }

        async fn find_overlapping(
            &self,
            user_id: UserId,
            range: DateRange,
            exclude: Option<ClaimId>,
        ) -> Result<Option<Claim>, StoreError> {
            self.inner.find_overlapping(user_id, range, exclude).await
        }

        async fn update(&self, claim: Claim) -> Result<Claim, StoreError> {
            if self.submit_before_edit {
                self.inner
                    .update_status(claim.id, ClaimStatus::Draft, ClaimStatus::PendingApproval, claim.meta.updated_at)
                    .await?;
            }
            self.inner.update(claim).await
        }

        async fn update_status(
            &self,
            _id: ClaimId,
            _expected: ClaimStatus,
            _new_status: ClaimStatus,
            _now: DateTime<Utc>,
        ) -> Result<StatusAck, StoreError> {
            self.ack.clone()
        }

        async fn search(
            &self,
            filter: &ClaimFilter,
            page: PageRequest,
        ) -> Result<(Vec<ClaimReadModel>, u64), StoreError> {
            self.inner.search(filter, page).await
        }
    }

    #[tokio::test]
    async fn failed_log_append_leaves_status_unchanged() {
        let fx = setup();
        let claim = fx.create(1, 5).await.unwrap();

        let service = ClaimLifecycleService::new(
            fx.store.clone(),
            Arc::new(FailingLogs),
            fx.directory.clone(),
            fx.directory.clone(),
        );
        let err = service
            .update_status(
                UpdateStatusInput {
                    claim_id: claim.id,
                    claim_status: ClaimStatus::PendingApproval,
                    comment: None,
                },
                &identity(&fx.claimer),
                day(2),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimError::Persistence(_)));
        assert_eq!(fx.status(claim.id).await, ClaimStatus::Draft);
    }

    #[tokio::test]
    async fn lost_or_failed_commit_keeps_audit_row_and_reports_error() {
        let fx = setup();
        let claim = fx.create(1, 5).await.unwrap();

        for (ack, expect_conflict) in [
            (Ok(StatusAck { matched: false }), true),
            (Err(StoreError::Backend("connection reset".into())), false),
        ] {
            let service = ClaimLifecycleService::new(
                Arc::new(StaleCommit {
                    inner: fx.store.clone(),
                    ack,
                    submit_before_edit: false,
                }),
                fx.store.clone(),
                fx.directory.clone(),
                fx.directory.clone(),
            );
            let err = service
                .update_status(
                    UpdateStatusInput {
                        claim_id: claim.id,
                        claim_status: ClaimStatus::PendingApproval,
                        comment: None,
                    },
                    &identity(&fx.claimer),
                    day(2),
                )
                .await
                .unwrap_err();
            if expect_conflict {
                assert!(matches!(err, ClaimError::Conflict(_)));
            } else {
                assert!(matches!(err, ClaimError::Persistence(_)));
            }
        }

        assert_eq!(fx.status(claim.id).await, ClaimStatus::Draft);
        assert_eq!(fx.logs(claim.id).await.len(), 2);
    }

    #[tokio::test]
    async fn edit_racing_a_submission_is_refused() {
        let fx = setup();
        let claim = fx.create(1, 5).await.unwrap();

        let service = ClaimLifecycleService::new(
            Arc::new(StaleCommit {
                inner: fx.store.clone(),
                ack: Ok(StatusAck { matched: true }),
                submit_before_edit: true,
            }),
            fx.store.clone(),
            fx.directory.clone(),
            fx.directory.clone(),
        );
        let mut input = fx.input(1, 5);
        input.claim_name = "Renamed".into();
        let err = service
            .update(claim.id, input, &identity(&fx.claimer), day(2))
            .await
            .unwrap_err();
        assert_eq!(err, ClaimError::InvalidState);

        let stored = fx.service.get(claim.id).await.unwrap();
        assert_eq!(stored.claim_status, ClaimStatus::PendingApproval);
        assert_eq!(stored.claim_name, claim.claim_name);
    }
}
