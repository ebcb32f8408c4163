use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use claimdesk_auth::{RoleCode, UserRecord};
use claimdesk_claims::ClaimStatus;
use claimdesk_core::{ClaimId, PageRequest, UserId};
use claimdesk_infra::read_model::ClaimFilter;

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

/// `{searchCondition, pageInfo}` body shared by the claim search endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimSearchRequest {
    #[serde(default)]
    pub search_condition: ClaimSearchCondition,
    #[serde(default)]
    pub page_info: PageRequest,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClaimSearchCondition {
    #[serde(default)]
    pub keyword: Option<String>,
    /// Empty string means "any status".
    #[serde(default)]
    pub claim_status: Option<String>,
    #[serde(default)]
    pub claim_start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub claim_end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub include_deleted: bool,
}

impl ClaimSearchCondition {
    pub fn into_filter(self) -> Result<ClaimFilter, axum::response::Response> {
        let claim_status = match self.claim_status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(ClaimStatus::parse(raw).ok_or_else(|| {
                errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "validation_error",
                    format!("claim_status '{raw}' is not a valid status"),
                )
            })?),
        };

        Ok(ClaimFilter {
            keyword: self.keyword,
            claim_status,
            claim_start_date: self.claim_start_date,
            claim_end_date: self.claim_end_date,
            user_id: None,
            approval_id: None,
            include_deleted: self.include_deleted,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimLogSearchRequest {
    #[serde(default)]
    pub search_condition: ClaimLogSearchCondition,
    #[serde(default)]
    pub page_info: PageRequest,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClaimLogSearchCondition {
    #[serde(default)]
    pub claim_id: Option<ClaimId>,
}

// -------------------------
// Response DTOs
// -------------------------

/// Caller's own account, as returned by `GET /auth`.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub user_name: String,
    pub role_code: RoleCode,
    pub role_name: Option<&'static str>,
    pub is_verified: bool,
    pub is_blocked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRecord> for UserProfile {
    fn from(user: UserRecord) -> Self {
        Self {
            role_name: user.role_code.label(),
            id: user.id,
            email: user.email,
            user_name: user.user_name,
            role_code: user.role_code,
            is_verified: user.is_verified,
            is_blocked: user.is_blocked,
            created_at: user.meta.created_at,
            updated_at: user.meta.updated_at,
        }
    }
}

// -------------------------
// Helpers
// -------------------------

/// Unwrap a JSON body, turning extractor rejections into the error envelope.
pub fn read_json<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, axum::response::Response> {
    body.map(|Json(value)| value).map_err(|rejection| {
        errors::json_error(StatusCode::BAD_REQUEST, "validation_error", rejection.body_text())
    })
}

pub fn parse_claim_id(raw: &str) -> Result<ClaimId, axum::response::Response> {
    raw.parse::<ClaimId>()
        .map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", e.message()))
}
