//! Postgres-backed directory (users, projects, employees).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use claimdesk_auth::{DirectoryError, RoleCode, UserDirectory, UserRecord};
use claimdesk_core::{Lifecycle, ProjectId, RecordMeta, UserId};
use claimdesk_directory::{Project, ProjectMember, ProjectStatus};

use super::ProjectDirectory;

#[derive(Debug, Clone)]
pub struct PostgresDirectory {
    pool: Arc<PgPool>,
}

impl PostgresDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> DirectoryError {
    match err {
        sqlx::Error::Database(db_err) => {
            DirectoryError::Backend(format!("database error in {}: {}", operation, db_err.message()))
        }
        sqlx::Error::PoolClosed => {
            DirectoryError::Backend(format!("connection pool closed in {}", operation))
        }
        _ => DirectoryError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

pub(crate) fn read_meta(row: &PgRow) -> Result<RecordMeta, sqlx::Error> {
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let is_deleted: bool = row.try_get("is_deleted")?;
    let deleted_at: Option<DateTime<Utc>> = row.try_get("deleted_at")?;
    Ok(RecordMeta {
        created_at,
        updated_at: row.try_get("updated_at")?,
        lifecycle: Lifecycle::from_columns(is_deleted, deleted_at, created_at),
    })
}

fn user_from_row(row: &PgRow) -> Result<UserRecord, sqlx::Error> {
    let id: uuid::Uuid = row.try_get("id")?;
    let role_code: String = row.try_get("role_code")?;
    let token_version: i64 = row.try_get("token_version")?;
    Ok(UserRecord {
        id: UserId::from_uuid(id),
        email: row.try_get("email")?,
        user_name: row.try_get("user_name")?,
        role_code: RoleCode::from(role_code),
        is_verified: row.try_get("is_verified")?,
        is_blocked: row.try_get("is_blocked")?,
        token_version: u64::try_from(token_version).unwrap_or(0),
        meta: read_meta(row)?,
    })
}

fn project_from_rows(id: ProjectId, row: &PgRow, members: &[PgRow]) -> Result<Project, sqlx::Error> {
    let status: String = row.try_get("project_status")?;
    let mut project_members = Vec::with_capacity(members.len());
    for m in members {
        let user_id: uuid::Uuid = m.try_get("user_id")?;
        project_members.push(ProjectMember {
            user_id: UserId::from_uuid(user_id),
            project_role: m.try_get("project_role")?,
        });
    }
    Ok(Project {
        id,
        project_code: row.try_get("project_code")?,
        project_name: row.try_get("project_name")?,
        project_status: ProjectStatus::parse(&status).unwrap_or_default(),
        project_start_date: row.try_get("project_start_date")?,
        project_end_date: row.try_get("project_end_date")?,
        project_members,
        meta: read_meta(row)?,
    })
}

#[async_trait::async_trait]
impl UserDirectory for PostgresDirectory {
    #[instrument(skip(self), fields(user_id = %id))]
    async fn find_user(&self, id: UserId) -> Result<Option<UserRecord>, DirectoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, user_name, role_code, is_verified, is_blocked, token_version,
                   created_at, updated_at, is_deleted, deleted_at
            FROM users
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_user", e))?;

        row.map(|r| user_from_row(&r))
            .transpose()
            .map_err(|e| map_sqlx_error("find_user", e))
    }

    #[instrument(skip(self), fields(user_id = %id))]
    async fn bump_token_version(&self, id: UserId) -> Result<u64, DirectoryError> {
        let row = sqlx::query(
            r#"
            UPDATE users
            SET token_version = token_version + 1, updated_at = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            RETURNING token_version
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("bump_token_version", e))?
        .ok_or(DirectoryError::NotFound)?;

        let version: i64 = row
            .try_get("token_version")
            .map_err(|e| map_sqlx_error("bump_token_version", e))?;
        Ok(u64::try_from(version).unwrap_or(0))
    }
}

#[async_trait::async_trait]
impl ProjectDirectory for PostgresDirectory {
    #[instrument(skip(self), fields(project_id = %id))]
    async fn find_project(&self, id: ProjectId) -> Result<Option<Project>, DirectoryError> {
        let Some(row) = sqlx::query(
            r#"
            SELECT id, project_code, project_name, project_status, project_start_date,
                   project_end_date, created_at, updated_at, is_deleted, deleted_at
            FROM projects
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_project", e))?
        else {
            return Ok(None);
        };

        let members = sqlx::query(
            "SELECT user_id, project_role FROM project_members WHERE project_id = $1 ORDER BY user_id",
        )
        .bind(id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_project_members", e))?;

        let project = project_from_rows(id, &row, &members)
            .map_err(|e| map_sqlx_error("find_project", e))?;

        Ok(Some(project))
    }
}
