//! Catalog domain model.
//!
//! # Responsibility
//! - Define the course and degree program records persisted by core.
//! - Own required-field validation shared by services and tests.
//!
//! # Invariants
//! - `id` is `None` until the store assigns one on insert.
//! - `created_at` never changes after the first insert.
//! - `updated_at` strictly increases on every write.

use chrono::{NaiveDateTime, TimeDelta, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod course;
pub mod program;

/// Write-time timestamp hooks used by the repository engine.
pub trait Timestamped {
    fn created_at(&self) -> NaiveDateTime;
    fn updated_at(&self) -> NaiveDateTime;

    /// Stamps both timestamps for a fresh insert.
    fn mark_created(&mut self, now: NaiveDateTime);

    /// Advances `updated_at` past its current value.
    fn mark_updated(&mut self, now: NaiveDateTime);
}

/// Current UTC wall-clock time, as stored in timestamp columns.
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Returns `now` unless the clock has not moved past `previous`, in which
/// case the smallest representable step after `previous` is used.
pub(crate) fn next_update_stamp(previous: NaiveDateTime, now: NaiveDateTime) -> NaiveDateTime {
    let floor = previous + TimeDelta::microseconds(1);
    now.max(floor)
}

/// Required-field violation detected before any persistence call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is empty or whitespace only.
    BlankField(&'static str),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "`{field}` is required and must not be blank"),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{next_update_stamp, now, require_text, ValidationError};
    use chrono::TimeDelta;

    #[test]
    fn update_stamp_moves_forward_even_when_clock_lags() {
        let previous = now() + TimeDelta::seconds(10);
        let stamp = next_update_stamp(previous, now());
        assert!(stamp > previous);
    }

    #[test]
    fn update_stamp_uses_clock_when_ahead() {
        let current = now();
        let previous = current - TimeDelta::seconds(10);
        assert_eq!(next_update_stamp(previous, current), current);
    }

    #[test]
    fn require_text_rejects_whitespace() {
        assert_eq!(
            require_text("name", " \t "),
            Err(ValidationError::BlankField("name"))
        );
        assert!(require_text("name", "Algorithms").is_ok());
    }
}
