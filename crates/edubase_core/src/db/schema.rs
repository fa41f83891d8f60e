//! Table bootstrap for the two entity tables.
//!
//! Every statement is `IF NOT EXISTS`, so running it against an already
//! populated database is a no-op.

use super::DbResult;
use rusqlite::Connection;

pub const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Creates missing tables and indexes in one transaction.
pub fn bootstrap_schema(conn: &mut Connection) -> DbResult<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA_SQL)?;
    tx.commit()?;
    Ok(())
}
