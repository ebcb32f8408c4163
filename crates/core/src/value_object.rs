//! Value object trait: equality by value, not identity.
//!
//! Value objects are domain objects that have **no identity**. Two value objects
//! with the same values are considered equal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// create a new one with the new values.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// A half-open date interval `[start, end)`.
///
/// Construction rejects `start > end`. Two ranges that only touch
/// (`a.end == b.start`) do not overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl ValueObject for DateRange {}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> DomainResult<Self> {
        if start > end {
            return Err(DomainError::validation(
                "Invalid date range, start date must be less than or equal to end date",
            ));
        }
        Ok(Self { start, end })
    }

    /// Range covering both instants, whichever comes first.
    pub fn spanning(a: DateTime<Utc>, b: DateTime<Utc>) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// `self.start < other.end && self.end > other.start`.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start < other.end && self.end > other.start
    }
}
