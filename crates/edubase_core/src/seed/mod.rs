//! JSON seed loading and export.
//!
//! # Responsibility
//! - Merge course and program lists from JSON files into the store.
//! - Write the store contents back out in the same shape.
//!
//! # Invariants
//! - Loading the same files repeatedly never duplicates rows: any entity
//!   whose id already exists is skipped.
//! - A missing or malformed source is logged and skipped; the remaining
//!   sources still load.

use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod loader;

pub use loader::{
    ExportReport, SeedLoader, SeedReport, SourceOutcome, COURSES_FILE_NAME, PROGRAMS_FILE_NAME,
};

pub type SeedResult<T> = Result<T, SeedError>;

#[derive(Debug)]
pub enum SeedError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
    Encode(serde_json::Error),
    Repo(RepoError),
}

impl Display for SeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "i/o error on `{}`: {source}", path.display()),
            Self::Decode { path, source } => {
                write!(f, "malformed seed file `{}`: {source}", path.display())
            }
            Self::Encode(err) => write!(f, "failed to encode export: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SeedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Decode { source, .. } => Some(source),
            Self::Encode(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for SeedError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}
