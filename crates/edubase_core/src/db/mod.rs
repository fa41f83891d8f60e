//! SQLite connection pooling and schema bootstrap.
//!
//! # Responsibility
//! - Own the process-wide connection pool behind an explicit handle.
//! - Configure every pooled connection the same way.
//! - Create the `courses` and `programs` tables on first initialization.
//!
//! # Invariants
//! - No connection is handed out before `initialize` or after `close`.
//! - Connections are returned to the pool when the guard is dropped.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod provider;
mod schema;

pub use provider::{ConnectionProvider, PoolStatus, PooledConn};
pub use schema::{bootstrap_schema, SCHEMA_SQL};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    /// Provider used before `initialize`.
    NotInitialized,
    /// `initialize` called on a provider that was already set up.
    AlreadyInitialized,
    /// Provider used after `close`.
    Closed,
    /// Pool could not lend a connection in time, or the store is unreachable.
    Connection(r2d2::Error),
    /// Statement or constraint failure reported by SQLite.
    Sqlite(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "connection provider is not initialized"),
            Self::AlreadyInitialized => write!(f, "connection provider is already initialized"),
            Self::Closed => write!(f, "connection provider is closed"),
            Self::Connection(err) => write!(f, "no connection available: {err}"),
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotInitialized | Self::AlreadyInitialized | Self::Closed => None,
            Self::Connection(err) => Some(err),
            Self::Sqlite(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<r2d2::Error> for DbError {
    fn from(value: r2d2::Error) -> Self {
        Self::Connection(value)
    }
}
