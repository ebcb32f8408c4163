//! User records as seen by the access boundary, and the lookup seam.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use claimdesk_core::{Entity, RecordMeta, UserId};

use crate::RoleCode;

/// A stored user account.
///
/// Password material is not part of this record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub email: String,
    pub user_name: String,
    pub role_code: RoleCode,
    pub is_verified: bool,
    pub is_blocked: bool,
    /// Bumped on logout; tokens carrying an older value are revoked.
    pub token_version: u64,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

impl Entity for UserRecord {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }
}

impl UserRecord {
    /// Whether credentials for this user may still be honoured.
    pub fn can_authenticate(&self) -> bool {
        self.is_active() && self.is_verified
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("user not found")]
    NotFound,

    #[error("directory backend error: {0}")]
    Backend(String),
}

/// Read/write access to user accounts needed by authentication.
#[async_trait::async_trait]
pub trait UserDirectory: Send + Sync {
    /// Active (not soft-deleted) user by id.
    async fn find_user(&self, id: UserId) -> Result<Option<UserRecord>, DirectoryError>;

    /// Increment the user's token version and return the new value.
    async fn bump_token_version(&self, id: UserId) -> Result<u64, DirectoryError>;
}

#[async_trait::async_trait]
impl<D> UserDirectory for Arc<D>
where
    D: UserDirectory + ?Sized,
{
    async fn find_user(&self, id: UserId) -> Result<Option<UserRecord>, DirectoryError> {
        (**self).find_user(id).await
    }

    async fn bump_token_version(&self, id: UserId) -> Result<u64, DirectoryError> {
        (**self).bump_token_version(id).await
    }
}
