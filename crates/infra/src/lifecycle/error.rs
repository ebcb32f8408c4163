use thiserror::Error;

use claimdesk_auth::DirectoryError;
use claimdesk_claims::TransitionError;
use claimdesk_core::DomainError;

use crate::claim_store::StoreError;

/// Failure of a claim lifecycle operation.
///
/// Variants group into validation, business-rule, authorization, not-found
/// and persistence failures; [`ClaimError::code`] gives the stable wire code.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClaimError {
    /// Malformed or missing input.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    InvalidRange(String),

    #[error("Claim date range conflicts with an existing claim!")]
    DateRangeConflict,

    #[error("{0}")]
    InvalidApprover(String),

    #[error("You can only select projects where you are a member!")]
    NotProjectMember,

    #[error("Only claim with status is draft can be updated.")]
    InvalidState,

    #[error("{0}")]
    NoOpTransition(String),

    #[error("{0}")]
    IllegalTransition(String),

    #[error("{0}")]
    MissingReason(String),

    /// Ownership or self-review rule refused the actor.
    #[error("{0}")]
    Forbidden(String),

    /// The actor's role may not perform this transition.
    #[error("{0}")]
    Unauthorized(String),

    /// Referenced record absent; message reads "... is not exists.".
    #[error("{0}")]
    NotFound(String),

    /// The claim's status changed between read and commit.
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Persistence(String),
}

impl ClaimError {
    pub fn not_found(what: &str) -> Self {
        Self::NotFound(format!("{what} is not exists."))
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::InvalidRange(_) => "invalid_range",
            Self::DateRangeConflict => "date_range_conflict",
            Self::InvalidApprover(_) => "invalid_approver",
            Self::NotProjectMember => "not_project_member",
            Self::InvalidState => "invalid_state",
            Self::NoOpTransition(_) => "noop_transition",
            Self::IllegalTransition(_) => "illegal_transition",
            Self::MissingReason(_) => "missing_reason",
            Self::Forbidden(_) => "forbidden",
            Self::Unauthorized(_) => "unauthorized",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Persistence(_) => "persistence_error",
        }
    }
}

impl From<DomainError> for ClaimError {
    fn from(value: DomainError) -> Self {
        ClaimError::Validation(value.message().to_string())
    }
}

impl From<TransitionError> for ClaimError {
    fn from(value: TransitionError) -> Self {
        let msg = value.to_string();
        match value {
            TransitionError::NotOwner | TransitionError::SelfReview => ClaimError::Forbidden(msg),
            TransitionError::NoOp(_) => ClaimError::NoOpTransition(msg),
            TransitionError::Illegal { .. } => ClaimError::IllegalTransition(msg),
            TransitionError::RoleNotAllowed { .. } => ClaimError::Unauthorized(msg),
            TransitionError::MissingReason => ClaimError::MissingReason(msg),
        }
    }
}

impl From<StoreError> for ClaimError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotEditable(_) => ClaimError::InvalidState,
            other => ClaimError::Persistence(other.to_string()),
        }
    }
}

impl From<DirectoryError> for ClaimError {
    fn from(value: DirectoryError) -> Self {
        ClaimError::Persistence(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claimdesk_claims::ClaimStatus;

    #[test]
    fn transition_errors_keep_their_message() {
        let err = ClaimError::from(TransitionError::Illegal {
            from: ClaimStatus::Draft,
            to: ClaimStatus::Rejected,
        });
        assert_eq!(err.code(), "illegal_transition");
        assert_eq!(err.to_string(), "Invalid status change. Current status: Draft -> Rejected");

        assert!(matches!(
            ClaimError::from(TransitionError::SelfReview),
            ClaimError::Forbidden(_)
        ));
    }

    #[test]
    fn store_errors_map_to_state_or_persistence() {
        assert_eq!(
            ClaimError::from(StoreError::NotEditable("claim x is Paid".into())),
            ClaimError::InvalidState
        );
        assert!(matches!(
            ClaimError::from(StoreError::Backend("down".into())),
            ClaimError::Persistence(_)
        ));
    }

    #[test]
    fn not_found_uses_house_phrasing() {
        assert_eq!(
            ClaimError::not_found("Claim request info").to_string(),
            "Claim request info is not exists."
        );
    }
}
