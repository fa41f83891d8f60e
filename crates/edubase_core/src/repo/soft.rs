//! Soft-failure policy for repository operations.
//!
//! Store errors (unreachable store, exhausted pool, failed statement) are
//! logged at the operation boundary and replaced with a neutral value:
//! `None`, an empty list, `0` or `false`. Callers see "nothing found" or
//! "nothing changed". Lifecycle errors (provider never opened, or already
//! closed) always propagate.

use super::{RepoError, RepoResult};
use crate::db::{DbError, DbResult};
use log::error;

pub trait SoftFailure<T> {
    /// Keeps the value on success; logs and yields `Ok(None)` on store errors.
    fn soften(self, op: &'static str, table: &'static str) -> RepoResult<Option<T>>;

    /// Like [`soften`](Self::soften), with `T::default()` as the fallback.
    fn soften_or_default(self, op: &'static str, table: &'static str) -> RepoResult<T>
    where
        T: Default;
}

impl<T> SoftFailure<T> for DbResult<T> {
    fn soften(self, op: &'static str, table: &'static str) -> RepoResult<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(DbError::NotInitialized) => Err(RepoError::NotInitialized),
            Err(DbError::Closed) => Err(RepoError::Closed),
            Err(err) => {
                error!("event=repo_{op} module=repo status=error table={table} error={err}");
                Ok(None)
            }
        }
    }

    fn soften_or_default(self, op: &'static str, table: &'static str) -> RepoResult<T>
    where
        T: Default,
    {
        self.soften(op, table).map(Option::unwrap_or_default)
    }
}
