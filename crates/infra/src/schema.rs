//! Postgres schema for the persistent adapters.
//!
//! Every statement is idempotent so [`migrate`] can run on each startup.

use sqlx::PgPool;
use tracing::{info, instrument};

use crate::claim_store::StoreError;

/// DDL statements, applied in order.
pub const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id              UUID PRIMARY KEY,
        email           TEXT NOT NULL UNIQUE,
        user_name       TEXT NOT NULL,
        role_code       TEXT NOT NULL,
        is_verified     BOOLEAN NOT NULL DEFAULT FALSE,
        is_blocked      BOOLEAN NOT NULL DEFAULT FALSE,
        token_version   BIGINT NOT NULL DEFAULT 0,
        created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        is_deleted      BOOLEAN NOT NULL DEFAULT FALSE,
        deleted_at      TIMESTAMPTZ
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS projects (
        id                  UUID PRIMARY KEY,
        project_code        TEXT NOT NULL UNIQUE,
        project_name        TEXT NOT NULL,
        project_status      TEXT NOT NULL,
        project_start_date  TIMESTAMPTZ,
        project_end_date    TIMESTAMPTZ,
        created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        is_deleted          BOOLEAN NOT NULL DEFAULT FALSE,
        deleted_at          TIMESTAMPTZ
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS project_members (
        project_id      UUID NOT NULL REFERENCES projects(id),
        user_id         UUID NOT NULL REFERENCES users(id),
        project_role    TEXT NOT NULL,
        PRIMARY KEY (project_id, user_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS employees (
        user_id         UUID PRIMARY KEY REFERENCES users(id),
        full_name       TEXT NOT NULL,
        job_rank        TEXT NOT NULL DEFAULT '',
        job_title       TEXT NOT NULL DEFAULT '',
        department_name TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS claims (
        id                  UUID PRIMARY KEY,
        user_id             UUID NOT NULL,
        project_id          UUID NOT NULL,
        approval_id         UUID NOT NULL,
        claim_name          TEXT NOT NULL,
        claim_status        TEXT NOT NULL,
        claim_start_date    TIMESTAMPTZ NOT NULL,
        claim_end_date      TIMESTAMPTZ NOT NULL,
        total_work_time     DOUBLE PRECISION NOT NULL DEFAULT 0,
        remarks             TEXT NOT NULL DEFAULT '',
        created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        is_deleted          BOOLEAN NOT NULL DEFAULT FALSE,
        deleted_at          TIMESTAMPTZ,
        CHECK (claim_start_date <= claim_end_date)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS claims_user_range_idx ON claims (user_id, claim_start_date, claim_end_date)",
    "CREATE INDEX IF NOT EXISTS claims_approval_idx ON claims (approval_id)",
    r#"
    CREATE TABLE IF NOT EXISTS claim_logs (
        id          UUID PRIMARY KEY,
        claim_id    UUID NOT NULL REFERENCES claims(id),
        user_id     UUID NOT NULL,
        old_status  TEXT NOT NULL,
        new_status  TEXT NOT NULL,
        comment     TEXT,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        is_deleted  BOOLEAN NOT NULL DEFAULT FALSE,
        deleted_at  TIMESTAMPTZ
    )
    "#,
    "CREATE INDEX IF NOT EXISTS claim_logs_claim_idx ON claim_logs (claim_id, created_at DESC)",
];

/// Apply [`SCHEMA`] to the database.
#[instrument(skip(pool), err)]
pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| StoreError::Backend(format!("migration failed: {e}")))?;
    }
    info!(statements = SCHEMA.len(), "schema applied");
    Ok(())
}
