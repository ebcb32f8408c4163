//! Postgres-backed claim store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Duplicate` |
//! | Database (other) | any other | `Backend` |
//! | PoolClosed / other | N/A | `Backend` |
//!
//! Search runs as one joined `SELECT` plus a `COUNT(*)` over the same predicate.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use claimdesk_auth::RoleCode;
use claimdesk_claims::{Claim, ClaimLog, ClaimStatus};
use claimdesk_core::{ClaimId, ClaimLogId, DateRange, PageRequest, ProjectId, UserId};
use claimdesk_directory::{Employee, ProjectStatus};

use crate::directory::postgres::read_meta;
use crate::read_model::{
    ApprovalInfo, ClaimFilter, ClaimLogFilter, ClaimLogReadModel, ClaimReadModel, ProjectInfo,
};

use super::r#trait::{ClaimLogStore, ClaimStore, StatusAck, StoreError};

#[derive(Debug, Clone)]
pub struct PostgresClaimStore {
    pool: Arc<PgPool>,
}

impl PostgresClaimStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Duplicate(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

fn parse_status(raw: &str) -> Result<ClaimStatus, sqlx::Error> {
    ClaimStatus::parse(raw).ok_or_else(|| sqlx::Error::Decode(format!("unknown claim status '{raw}'").into()))
}

/// `%keyword%` with LIKE metacharacters escaped.
fn like_pattern(keyword: &str) -> String {
    let escaped = keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

const CLAIM_COLUMNS: &str = r#"
    c.id, c.user_id, c.project_id, c.approval_id, c.claim_name, c.claim_status,
    c.claim_start_date, c.claim_end_date, c.total_work_time, c.remarks,
    c.created_at, c.updated_at, c.is_deleted, c.deleted_at
"#;

/// Shared predicate for search and count; binds $1..$7.
const CLAIM_FILTER: &str = r#"
    ($1::boolean OR c.is_deleted = FALSE)
    AND ($2::text IS NULL OR c.claim_name ILIKE $2)
    AND ($3::text IS NULL OR c.claim_status = $3)
    AND ($4::timestamptz IS NULL OR c.claim_start_date >= $4)
    AND ($5::timestamptz IS NULL OR c.claim_end_date <= $5)
    AND ($6::uuid IS NULL OR c.user_id = $6)
    AND ($7::uuid IS NULL OR c.approval_id = $7)
"#;

fn claim_from_row(row: &PgRow) -> Result<Claim, sqlx::Error> {
    let id: uuid::Uuid = row.try_get("id")?;
    let user_id: uuid::Uuid = row.try_get("user_id")?;
    let project_id: uuid::Uuid = row.try_get("project_id")?;
    let approval_id: uuid::Uuid = row.try_get("approval_id")?;
    let status: String = row.try_get("claim_status")?;
    Ok(Claim {
        id: ClaimId::from_uuid(id),
        user_id: UserId::from_uuid(user_id),
        project_id: ProjectId::from_uuid(project_id),
        approval_id: UserId::from_uuid(approval_id),
        claim_name: row.try_get("claim_name")?,
        claim_status: parse_status(&status)?,
        claim_start_date: row.try_get("claim_start_date")?,
        claim_end_date: row.try_get("claim_end_date")?,
        total_work_time: row.try_get("total_work_time")?,
        remarks: row.try_get("remarks")?,
        meta: read_meta(row)?,
    })
}

fn read_model_from_row(row: &PgRow) -> Result<ClaimReadModel, sqlx::Error> {
    let claim = claim_from_row(row)?;

    let staff_role: Option<String> = row.try_get("staff_role")?;

    let employee_info = match row.try_get::<Option<String>, _>("employee_full_name")? {
        Some(full_name) => Some(Employee {
            user_id: claim.user_id,
            full_name,
            job_rank: row.try_get("employee_job_rank")?,
            job_title: row.try_get("employee_job_title")?,
            department_name: row.try_get("employee_department_name")?,
        }),
        None => None,
    };

    let approval_info = match row.try_get::<Option<uuid::Uuid>, _>("approver_id")? {
        Some(id) => {
            let role: String = row.try_get("approver_role")?;
            Some(ApprovalInfo {
                id: UserId::from_uuid(id),
                user_name: row.try_get("approver_name")?,
                email: row.try_get("approver_email")?,
                role_code: RoleCode::from(role),
            })
        }
        None => None,
    };

    let project_info = match row.try_get::<Option<uuid::Uuid>, _>("project_ref")? {
        Some(id) => {
            let status: String = row.try_get("project_status")?;
            Some(ProjectInfo {
                id: ProjectId::from_uuid(id),
                project_code: row.try_get("project_code")?,
                project_name: row.try_get("project_name")?,
                project_status: ProjectStatus::parse(&status).unwrap_or_default(),
            })
        }
        None => None,
    };

    Ok(ClaimReadModel {
        id: claim.id,
        staff_id: claim.user_id,
        staff_name: row.try_get("staff_name")?,
        staff_email: row.try_get("staff_email")?,
        staff_role: staff_role.map(RoleCode::from),
        employee_info,
        approval_info,
        project_info,
        role_in_project: row.try_get("role_in_project")?,
        is_deleted: claim.meta.is_deleted(),
        created_at: claim.meta.created_at,
        updated_at: claim.meta.updated_at,
        claim_name: claim.claim_name,
        claim_status: claim.claim_status,
        claim_start_date: claim.claim_start_date,
        claim_end_date: claim.claim_end_date,
        total_work_time: claim.total_work_time,
        remarks: claim.remarks,
    })
}

fn log_read_model_from_row(row: &PgRow) -> Result<ClaimLogReadModel, sqlx::Error> {
    let id: uuid::Uuid = row.try_get("id")?;
    let claim_id: uuid::Uuid = row.try_get("claim_id")?;
    let user_id: uuid::Uuid = row.try_get("user_id")?;
    let old_status: String = row.try_get("old_status")?;
    let new_status: String = row.try_get("new_status")?;
    let meta = read_meta(row)?;
    Ok(ClaimLogReadModel {
        id: ClaimLogId::from_uuid(id),
        claim_id: ClaimId::from_uuid(claim_id),
        claim_name: row.try_get("claim_name")?,
        updated_by: row.try_get("updated_by")?,
        updated_by_user_id: UserId::from_uuid(user_id),
        old_status: parse_status(&old_status)?,
        new_status: parse_status(&new_status)?,
        comment: row.try_get("comment")?,
        is_deleted: meta.is_deleted(),
        created_at: meta.created_at,
        updated_at: meta.updated_at,
    })
}

#[async_trait::async_trait]
impl ClaimStore for PostgresClaimStore {
    #[instrument(skip(self, claim), fields(claim_id = %claim.id, user_id = %claim.user_id), err)]
    async fn create(&self, claim: Claim) -> Result<Claim, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO claims (
                id, user_id, project_id, approval_id, claim_name, claim_status,
                claim_start_date, claim_end_date, total_work_time, remarks,
                created_at, updated_at, is_deleted, deleted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(claim.id.as_uuid())
        .bind(claim.user_id.as_uuid())
        .bind(claim.project_id.as_uuid())
        .bind(claim.approval_id.as_uuid())
        .bind(&claim.claim_name)
        .bind(claim.claim_status.as_str())
        .bind(claim.claim_start_date)
        .bind(claim.claim_end_date)
        .bind(claim.total_work_time)
        .bind(&claim.remarks)
        .bind(claim.meta.created_at)
        .bind(claim.meta.updated_at)
        .bind(claim.meta.is_deleted())
        .bind(claim.meta.lifecycle.retired_at())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_claim", e))?;

        Ok(claim)
    }

    #[instrument(skip(self), fields(claim_id = %id), err)]
    async fn find_by_id(&self, id: ClaimId) -> Result<Option<Claim>, StoreError> {
        let sql = format!("SELECT {CLAIM_COLUMNS} FROM claims c WHERE c.id = $1 AND c.is_deleted = FALSE");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_claim", e))?;

        row.map(|r| claim_from_row(&r))
            .transpose()
            .map_err(|e| map_sqlx_error("find_claim", e))
    }

    #[instrument(skip(self), fields(user_id = %user_id), err)]
    async fn find_overlapping(
        &self,
        user_id: UserId,
        range: DateRange,
        exclude: Option<ClaimId>,
    ) -> Result<Option<Claim>, StoreError> {
        let sql = format!(
            r#"
            SELECT {CLAIM_COLUMNS}
            FROM claims c
            WHERE c.user_id = $1
              AND c.is_deleted = FALSE
              AND c.claim_status <> $2
              AND c.claim_start_date < $3
              AND c.claim_end_date > $4
              AND ($5::uuid IS NULL OR c.id <> $5)
            ORDER BY c.claim_start_date ASC, c.id ASC
            LIMIT 1
            "#
        );
        let row = sqlx::query(&sql)
            .bind(user_id.as_uuid())
            .bind(ClaimStatus::Canceled.as_str())
            .bind(range.end())
            .bind(range.start())
            .bind(exclude.map(|id| *id.as_uuid()))
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_overlapping", e))?;

        row.map(|r| claim_from_row(&r))
            .transpose()
            .map_err(|e| map_sqlx_error("find_overlapping", e))
    }

    #[instrument(skip(self, claim), fields(claim_id = %claim.id), err)]
    async fn update(&self, claim: Claim) -> Result<Claim, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE claims
            SET project_id = $2,
                approval_id = $3,
                claim_name = $4,
                claim_start_date = $5,
                claim_end_date = $6,
                total_work_time = $7,
                remarks = $8,
                updated_at = $9
            WHERE id = $1 AND is_deleted = FALSE AND claim_status = $10
            "#,
        )
        .bind(claim.id.as_uuid())
        .bind(claim.project_id.as_uuid())
        .bind(claim.approval_id.as_uuid())
        .bind(&claim.claim_name)
        .bind(claim.claim_start_date)
        .bind(claim.claim_end_date)
        .bind(claim.total_work_time)
        .bind(&claim.remarks)
        .bind(claim.meta.updated_at)
        .bind(ClaimStatus::Draft.as_str())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_claim", e))?;

        if result.rows_affected() == 0 {
            let current = sqlx::query("SELECT claim_status FROM claims WHERE id = $1 AND is_deleted = FALSE")
                .bind(claim.id.as_uuid())
                .fetch_optional(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("update_claim", e))?;
            return Err(match current {
                Some(row) => {
                    let status: String = row.try_get("claim_status").map_err(|e| map_sqlx_error("update_claim", e))?;
                    StoreError::NotEditable(format!("claim {} is {status}", claim.id))
                }
                None => StoreError::NotFound(format!("claim {}", claim.id)),
            });
        }
        Ok(claim)
    }

    #[instrument(skip(self), fields(claim_id = %id, from = %expected, to = %new_status), err)]
    async fn update_status(
        &self,
        id: ClaimId,
        expected: ClaimStatus,
        new_status: ClaimStatus,
        now: DateTime<Utc>,
    ) -> Result<StatusAck, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE claims
            SET claim_status = $3, updated_at = $4
            WHERE id = $1 AND claim_status = $2 AND is_deleted = FALSE
            "#,
        )
        .bind(id.as_uuid())
        .bind(expected.as_str())
        .bind(new_status.as_str())
        .bind(now)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_status", e))?;

        Ok(StatusAck {
            matched: result.rows_affected() == 1,
        })
    }

    #[instrument(skip(self, filter), fields(page_num = page.page_num, page_size = page.page_size), err)]
    async fn search(
        &self,
        filter: &ClaimFilter,
        page: PageRequest,
    ) -> Result<(Vec<ClaimReadModel>, u64), StoreError> {
        let keyword = filter.keyword().map(like_pattern);
        let status = filter.claim_status.map(|s| s.as_str());
        let user_id = filter.user_id.map(|u| *u.as_uuid());
        let approval_id = filter.approval_id.map(|u| *u.as_uuid());

        let count_sql = format!("SELECT COUNT(*) AS total FROM claims c WHERE {CLAIM_FILTER}");
        let count_row = sqlx::query(&count_sql)
            .bind(filter.include_deleted)
            .bind(keyword.as_deref())
            .bind(status)
            .bind(filter.claim_start_date)
            .bind(filter.claim_end_date)
            .bind(user_id)
            .bind(approval_id)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_claims", e))?;
        let total: i64 = count_row
            .try_get("total")
            .map_err(|e| map_sqlx_error("count_claims", e))?;

        let sql = format!(
            r#"
            SELECT {CLAIM_COLUMNS},
                su.user_name       AS staff_name,
                su.email           AS staff_email,
                su.role_code       AS staff_role,
                e.full_name        AS employee_full_name,
                e.job_rank         AS employee_job_rank,
                e.job_title        AS employee_job_title,
                e.department_name  AS employee_department_name,
                au.id              AS approver_id,
                au.user_name       AS approver_name,
                au.email           AS approver_email,
                au.role_code       AS approver_role,
                p.id               AS project_ref,
                p.project_code     AS project_code,
                p.project_name     AS project_name,
                p.project_status   AS project_status,
                pm.project_role    AS role_in_project
            FROM claims c
            LEFT JOIN users su ON su.id = c.user_id
            LEFT JOIN employees e ON e.user_id = c.user_id
            LEFT JOIN users au ON au.id = c.approval_id
            LEFT JOIN projects p ON p.id = c.project_id
            LEFT JOIN project_members pm ON pm.project_id = c.project_id AND pm.user_id = c.user_id
            WHERE {CLAIM_FILTER}
            ORDER BY c.updated_at DESC, c.created_at DESC, c.id DESC
            LIMIT $8 OFFSET $9
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(filter.include_deleted)
            .bind(keyword.as_deref())
            .bind(status)
            .bind(filter.claim_start_date)
            .bind(filter.claim_end_date)
            .bind(user_id)
            .bind(approval_id)
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("search_claims", e))?;

        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            items.push(read_model_from_row(row).map_err(|e| map_sqlx_error("search_claims", e))?);
        }

        Ok((items, u64::try_from(total).unwrap_or(0)))
    }
}

#[async_trait::async_trait]
impl ClaimLogStore for PostgresClaimStore {
    #[instrument(skip(self, log), fields(claim_id = %log.claim_id, from = %log.old_status, to = %log.new_status), err)]
    async fn append(&self, log: ClaimLog) -> Result<ClaimLog, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO claim_logs (
                id, claim_id, user_id, old_status, new_status, comment,
                created_at, updated_at, is_deleted, deleted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(log.id.as_uuid())
        .bind(log.claim_id.as_uuid())
        .bind(log.user_id.as_uuid())
        .bind(log.old_status.as_str())
        .bind(log.new_status.as_str())
        .bind(log.comment.as_deref())
        .bind(log.meta.created_at)
        .bind(log.meta.updated_at)
        .bind(log.meta.is_deleted())
        .bind(log.meta.lifecycle.retired_at())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("append_claim_log", e))?;

        Ok(log)
    }

    #[instrument(skip(self, filter), fields(claim_id = %filter.claim_id), err)]
    async fn list_for_claim(
        &self,
        filter: &ClaimLogFilter,
        page: PageRequest,
    ) -> Result<(Vec<ClaimLogReadModel>, u64), StoreError> {
        let count_row = sqlx::query(
            r#"
            SELECT COUNT(*) AS total
            FROM claim_logs l
            WHERE l.claim_id = $1 AND ($2::boolean OR l.is_deleted = FALSE)
            "#,
        )
        .bind(filter.claim_id.as_uuid())
        .bind(filter.include_deleted)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("count_claim_logs", e))?;
        let total: i64 = count_row
            .try_get("total")
            .map_err(|e| map_sqlx_error("count_claim_logs", e))?;

        let rows = sqlx::query(
            r#"
            SELECT l.id, l.claim_id, l.user_id, l.old_status, l.new_status, l.comment,
                   l.created_at, l.updated_at, l.is_deleted, l.deleted_at,
                   c.claim_name AS claim_name,
                   u.user_name  AS updated_by
            FROM claim_logs l
            LEFT JOIN claims c ON c.id = l.claim_id
            LEFT JOIN users u ON u.id = l.user_id
            WHERE l.claim_id = $1 AND ($2::boolean OR l.is_deleted = FALSE)
            ORDER BY l.created_at DESC, l.id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filter.claim_id.as_uuid())
        .bind(filter.include_deleted)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_claim_logs", e))?;

        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            items.push(
                log_read_model_from_row(row).map_err(|e| map_sqlx_error("list_claim_logs", e))?,
            );
        }
        Ok((items, u64::try_from(total).unwrap_or(0)))
    }
}
