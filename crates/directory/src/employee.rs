use serde::{Deserialize, Serialize};

use claimdesk_core::UserId;

/// Employee profile attached 1:1 to a user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub user_id: UserId,
    pub full_name: String,
    pub job_rank: String,
    pub job_title: String,
    pub department_name: String,
}
