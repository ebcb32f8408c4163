//! Pure rule check for a requested status change.

use thiserror::Error;

use claimdesk_auth::RoleCode;
use claimdesk_core::UserId;

use crate::{Claim, ClaimStatus, find_transition};

/// A status change as requested by an actor.
#[derive(Debug, Clone, Copy)]
pub struct TransitionRequest<'a> {
    pub claim: &'a Claim,
    pub actor_id: UserId,
    /// Role from the actor's stored user record.
    pub actor_role: &'a RoleCode,
    pub new_status: ClaimStatus,
    pub comment: Option<&'a str>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Only owner of the claim can cancel or submit approve it.")]
    NotOwner,

    #[error("Users with the Approval role cannot approve or reject their own claim status.")]
    SelfReview,

    #[error("This Claim has already with status is {0}")]
    NoOp(ClaimStatus),

    #[error("Invalid status change. Current status: {from} -> {to}")]
    Illegal { from: ClaimStatus, to: ClaimStatus },

    #[error("User with Role \"{role}\" is not authorized to change status from \"{from}\" to \"{to}\".")]
    RoleNotAllowed {
        role: RoleCode,
        from: ClaimStatus,
        to: ClaimStatus,
    },

    #[error("Please comment the reason for action rejected this claim!")]
    MissingReason,
}

/// Check a transition in order: no-op, matrix, ownership, self-review, role, reason.
///
/// The first failing rule wins, so a pair the matrix never allows is
/// `Illegal` for every actor.
pub fn check_transition(req: &TransitionRequest<'_>) -> Result<(), TransitionError> {
    let from = req.claim.claim_status;
    let to = req.new_status;
    let is_owner = req.claim.user_id == req.actor_id;

    if from == to {
        return Err(TransitionError::NoOp(from));
    }

    let roles = find_transition(from, to).ok_or(TransitionError::Illegal { from, to })?;

    if matches!(to, ClaimStatus::Canceled | ClaimStatus::PendingApproval) && !is_owner {
        return Err(TransitionError::NotOwner);
    }

    if matches!(to, ClaimStatus::Approved | ClaimStatus::Rejected) && is_owner {
        return Err(TransitionError::SelfReview);
    }

    if !roles.contains(req.actor_role) {
        return Err(TransitionError::RoleNotAllowed {
            role: req.actor_role.clone(),
            from,
            to,
        });
    }

    let has_reason = req.comment.is_some_and(|c| !c.trim().is_empty());
    if to == ClaimStatus::Rejected && !has_reason {
        return Err(TransitionError::MissingReason);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use claimdesk_core::{ClaimId, ProjectId, RecordMeta};

    fn claim(owner: UserId, status: ClaimStatus) -> Claim {
        let now = Utc::now();
        Claim {
            id: ClaimId::new(),
            user_id: owner,
            project_id: ProjectId::new(),
            approval_id: UserId::new(),
            claim_name: "Week 12".into(),
            claim_status: status,
            claim_start_date: now,
            claim_end_date: now,
            total_work_time: 8.0,
            remarks: String::new(),
            meta: RecordMeta::created(now),
        }
    }

    fn check(
        claim: &Claim,
        actor: UserId,
        role: &RoleCode,
        to: ClaimStatus,
        comment: Option<&str>,
    ) -> Result<(), TransitionError> {
        check_transition(&TransitionRequest {
            claim,
            actor_id: actor,
            actor_role: role,
            new_status: to,
            comment,
        })
    }

    #[test]
    fn owner_submits_draft() {
        let owner = UserId::new();
        let c = claim(owner, ClaimStatus::Draft);
        assert_eq!(check(&c, owner, &RoleCode::CLAIMER, ClaimStatus::PendingApproval, None), Ok(()));
    }

    #[test]
    fn non_owner_cannot_submit_or_cancel() {
        let c = claim(UserId::new(), ClaimStatus::Draft);
        let other = UserId::new();
        for to in [ClaimStatus::PendingApproval, ClaimStatus::Canceled] {
            assert_eq!(
                check(&c, other, &RoleCode::APPROVAL, to, None),
                Err(TransitionError::NotOwner)
            );
        }
    }

    #[test]
    fn approver_cannot_rule_on_own_claim() {
        let owner = UserId::new();
        let c = claim(owner, ClaimStatus::PendingApproval);
        assert_eq!(
            check(&c, owner, &RoleCode::APPROVAL, ClaimStatus::Approved, None),
            Err(TransitionError::SelfReview)
        );
        assert_eq!(
            check(&c, owner, &RoleCode::APPROVAL, ClaimStatus::Rejected, Some("no")),
            Err(TransitionError::SelfReview)
        );
    }

    #[test]
    fn same_status_is_noop() {
        let c = claim(UserId::new(), ClaimStatus::Approved);
        let err = check(&c, UserId::new(), &RoleCode::FINANCE, ClaimStatus::Approved, None).unwrap_err();
        assert_eq!(err, TransitionError::NoOp(ClaimStatus::Approved));
        assert_eq!(err.to_string(), "This Claim has already with status is Approved");
    }

    #[test]
    fn draft_to_rejected_is_illegal_even_with_comment() {
        let c = claim(UserId::new(), ClaimStatus::Draft);
        let err = check(&c, UserId::new(), &RoleCode::APPROVAL, ClaimStatus::Rejected, Some("why")).unwrap_err();
        assert_eq!(
            err,
            TransitionError::Illegal {
                from: ClaimStatus::Draft,
                to: ClaimStatus::Rejected
            }
        );
        assert_eq!(err.to_string(), "Invalid status change. Current status: Draft -> Rejected");
    }

    #[test]
    fn owner_rejecting_own_draft_is_illegal_not_self_review() {
        let owner = UserId::new();
        let c = claim(owner, ClaimStatus::Draft);
        for role in [RoleCode::CLAIMER, RoleCode::APPROVAL] {
            assert_eq!(
                check(&c, owner, &role, ClaimStatus::Rejected, Some("typo")),
                Err(TransitionError::Illegal {
                    from: ClaimStatus::Draft,
                    to: ClaimStatus::Rejected
                })
            );
        }
    }

    #[test]
    fn non_owner_cancelling_pending_claim_is_illegal() {
        let c = claim(UserId::new(), ClaimStatus::PendingApproval);
        assert!(matches!(
            check(&c, UserId::new(), &RoleCode::APPROVAL, ClaimStatus::Canceled, None),
            Err(TransitionError::Illegal { .. })
        ));
    }

    #[test]
    fn wrong_role_is_refused() {
        let c = claim(UserId::new(), ClaimStatus::PendingApproval);
        let err = check(&c, UserId::new(), &RoleCode::FINANCE, ClaimStatus::Approved, None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "User with Role \"A002\" is not authorized to change status from \"Pending Approval\" to \"Approved\"."
        );
    }

    #[test]
    fn rejection_needs_a_reason() {
        let c = claim(UserId::new(), ClaimStatus::PendingApproval);
        let approver = UserId::new();
        for comment in [None, Some(""), Some("   ")] {
            assert_eq!(
                check(&c, approver, &RoleCode::APPROVAL, ClaimStatus::Rejected, comment),
                Err(TransitionError::MissingReason)
            );
        }
        assert_eq!(
            check(&c, approver, &RoleCode::APPROVAL, ClaimStatus::Rejected, Some("missing receipts")),
            Ok(())
        );
    }

    #[test]
    fn finance_pays_approved_claim() {
        let c = claim(UserId::new(), ClaimStatus::Approved);
        assert_eq!(check(&c, UserId::new(), &RoleCode::FINANCE, ClaimStatus::Paid, None), Ok(()));
        assert!(matches!(
            check(&c, UserId::new(), &RoleCode::ADMIN, ClaimStatus::Paid, None),
            Err(TransitionError::RoleNotAllowed { .. })
        ));
    }
}
