//! Repository layer: one generic CRUD engine plus per-table bindings.
//!
//! # Responsibility
//! - Map catalog entities to SQL rows and back.
//! - Keep SQL text inside the core persistence boundary.
//!
//! # Invariants
//! - Store-level failures never escape a repository call; they are logged
//!   and replaced by an empty result (see [`soft`]).
//! - Provider lifecycle errors always escape as [`RepoError`].

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod course_repo;
pub mod generic;
pub mod program_repo;
pub mod soft;

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors a repository call propagates instead of softening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoError {
    /// The connection provider was never initialized.
    NotInitialized,
    /// The connection provider has been closed.
    Closed,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "repository used before the store was initialized"),
            Self::Closed => write!(f, "repository used after the store was closed"),
        }
    }
}

impl Error for RepoError {}

/// Column text for a timestamp, in the layout rusqlite's chrono support reads
/// back losslessly.
pub(crate) fn timestamp_value(at: chrono::NaiveDateTime) -> rusqlite::types::Value {
    rusqlite::types::Value::Text(at.format("%Y-%m-%d %H:%M:%S%.f").to_string())
}
