//! Entity trait and the common base record every stored entity embeds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// Returns the shared bookkeeping fields.
    fn meta(&self) -> &RecordMeta;

    /// Whether the record is visible to default (active-only) queries.
    fn is_active(&self) -> bool {
        self.meta().lifecycle.is_active()
    }
}

/// Soft-delete state of a record.
///
/// Records are never physically removed; retiring one hides it from every
/// query that does not explicitly ask for retired rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Lifecycle {
    Active,
    Retired { retired_at: DateTime<Utc> },
}

impl Lifecycle {
    pub fn is_active(&self) -> bool {
        matches!(self, Lifecycle::Active)
    }

    pub fn retired_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Lifecycle::Active => None,
            Lifecycle::Retired { retired_at } => Some(*retired_at),
        }
    }

    /// Rebuild from the flat `is_deleted` / `deleted_at` column pair used by storage.
    pub fn from_columns(is_deleted: bool, deleted_at: Option<DateTime<Utc>>, fallback: DateTime<Utc>) -> Self {
        if is_deleted {
            Lifecycle::Retired {
                retired_at: deleted_at.unwrap_or(fallback),
            }
        } else {
            Lifecycle::Active
        }
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Lifecycle::Active
    }
}

/// Bookkeeping fields shared by every stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMeta {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub lifecycle: Lifecycle,
}

impl RecordMeta {
    /// Fresh, active record created at `now`.
    pub fn created(now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            updated_at: now,
            lifecycle: Lifecycle::Active,
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    pub fn retire(&mut self, now: DateTime<Utc>) {
        self.lifecycle = Lifecycle::Retired { retired_at: now };
        self.updated_at = now;
    }

    pub fn is_deleted(&self) -> bool {
        !self.lifecycle.is_active()
    }
}
