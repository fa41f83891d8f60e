//! Pooled connection provider.
//!
//! # Responsibility
//! - Build one bounded `r2d2` pool of SQLite connections per provider.
//! - Lend connections as RAII guards that return to the pool on drop.
//! - Track the `Uninitialized -> Open -> Closed` lifecycle explicitly.
//!
//! # Invariants
//! - `initialize` succeeds at most once per provider.
//! - `close` is idempotent; a closed provider never reopens.
//! - Waiting for a pooled connection never holds the state lock.

use super::schema::bootstrap_schema;
use super::{DbError, DbResult};
use crate::config::{DatabaseConfig, PoolSettings};
use log::{error, info, warn};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

/// Connection guard lent by [`ConnectionProvider::acquire`].
pub type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Snapshot of pool occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    pub connections: u32,
    pub idle_connections: u32,
}

enum ProviderState {
    Uninitialized,
    Open(Pool<SqliteConnectionManager>),
    Closed,
}

/// Owner of the shared connection pool.
///
/// Construct once at process start and pass `&ConnectionProvider` to every
/// repository, service and loader that needs the store.
pub struct ConnectionProvider {
    state: RwLock<ProviderState>,
}

impl Default for ConnectionProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionProvider {
    /// Creates a provider with no pool. Call [`initialize`](Self::initialize)
    /// before handing it to repositories.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(ProviderState::Uninitialized),
        }
    }

    /// Opens the pool described by `config` and bootstraps the schema.
    ///
    /// Blocks until `min_idle` connections are established or the connection
    /// timeout elapses.
    ///
    /// # Errors
    /// - `AlreadyInitialized` when called a second time, even after `close`.
    /// - `Connection` when the database cannot be opened in time.
    /// - `Sqlite` when the schema bootstrap fails.
    pub fn initialize(&self, config: &DatabaseConfig) -> DbResult<()> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if !matches!(*state, ProviderState::Uninitialized) {
            return Err(DbError::AlreadyInitialized);
        }

        let started_at = Instant::now();
        info!(
            "event=db_open module=db status=start path={}",
            config.path.display()
        );

        let pool = match build_pool(config).and_then(|pool| {
            let mut conn = pool.get()?;
            bootstrap_schema(&mut conn)?;
            Ok(pool)
        }) {
            Ok(pool) => pool,
            Err(err) => {
                error!(
                    "event=db_open module=db status=error path={} duration_ms={} error={}",
                    config.path.display(),
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err);
            }
        };

        let pool_state = pool.state();
        info!(
            "event=db_open module=db status=ok path={} duration_ms={} connections={} max_size={}",
            config.path.display(),
            started_at.elapsed().as_millis(),
            pool_state.connections,
            pool.max_size()
        );
        *state = ProviderState::Open(pool);
        Ok(())
    }

    /// Borrows one connection from the pool.
    ///
    /// The connection goes back to the pool when the returned guard drops.
    pub fn acquire(&self) -> DbResult<PooledConn> {
        // Clone the handle so a slow checkout does not block `close`.
        let pool = {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            match &*state {
                ProviderState::Uninitialized => return Err(DbError::NotInitialized),
                ProviderState::Closed => return Err(DbError::Closed),
                ProviderState::Open(pool) => pool.clone(),
            }
        };

        pool.get().map_err(|err| {
            warn!("event=db_acquire module=db status=error error={err}");
            DbError::Connection(err)
        })
    }

    /// Drops the pool, closing idle connections. Safe to call repeatedly.
    ///
    /// Guards still held by callers close when they are dropped.
    pub fn close(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if let ProviderState::Open(_) = &*state {
            *state = ProviderState::Closed;
            info!("event=db_close module=db status=ok");
        }
    }

    pub fn is_open(&self) -> bool {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        matches!(*state, ProviderState::Open(_))
    }

    /// Returns current pool occupancy, or `None` when the pool is not open.
    pub fn status(&self) -> Option<PoolStatus> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        match &*state {
            ProviderState::Open(pool) => {
                let pool_state = pool.state();
                Some(PoolStatus {
                    connections: pool_state.connections,
                    idle_connections: pool_state.idle_connections,
                })
            }
            ProviderState::Uninitialized | ProviderState::Closed => None,
        }
    }
}

fn build_pool(config: &DatabaseConfig) -> DbResult<Pool<SqliteConnectionManager>> {
    let settings = config.pool.clamped();
    let cache_size = settings.statement_cache_size;
    let busy_timeout = Duration::from_millis(settings.busy_timeout_ms);

    let manager = SqliteConnectionManager::file(&config.path).with_init(move |conn| {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(busy_timeout)?;
        conn.set_prepared_statement_cache_capacity(cache_size);
        Ok(())
    });

    let pool = pool_builder(&settings).build(manager)?;
    Ok(pool)
}

fn pool_builder(settings: &PoolSettings) -> r2d2::Builder<SqliteConnectionManager> {
    Pool::builder()
        .max_size(settings.max_size)
        .min_idle(Some(settings.min_idle))
        .idle_timeout(Some(Duration::from_millis(settings.idle_timeout_ms)))
        .connection_timeout(Duration::from_millis(settings.connection_timeout_ms))
        .max_lifetime(Some(Duration::from_millis(settings.max_lifetime_ms)))
}
