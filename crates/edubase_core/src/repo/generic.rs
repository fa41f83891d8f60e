//! Generic CRUD engine shared by every table binding.
//!
//! # Responsibility
//! - Run id-keyed reads, writes and counts for any [`EntityBinding`].
//! - Stamp timestamps and write store-assigned ids back onto values.
//! - Borrow exactly one pooled connection per operation.
//!
//! # Invariants
//! - Ids come from the store (`RETURNING id`); callers never choose them,
//!   except through [`Repository::import`].
//! - `created_at` is never part of an UPDATE.
//! - A rewritten row's `updated_at` is later than the stored one, whatever
//!   the value passed in carries.
//! - `save` and `update` read the stored row and write inside one immediate
//!   transaction.

use super::soft::SoftFailure;
use super::RepoResult;
use crate::db::{ConnectionProvider, DbResult};
use crate::model::{next_update_stamp, now, Timestamped};
use chrono::NaiveDateTime;
use log::{debug, info, warn};
use rusqlite::types::{FromSql, Value};
use rusqlite::{
    params_from_iter, Connection, OptionalExtension, Row, ToSql, TransactionBehavior,
};
use std::fmt::Display;
use std::marker::PhantomData;

/// Table-specific hooks the engine needs to persist one entity type.
///
/// Implemented on zero-sized marker types, one per table.
pub trait EntityBinding {
    type Entity: Timestamped;
    type Id: ToSql + FromSql + Copy + Display;

    const TABLE: &'static str;
    /// Column list used by every SELECT.
    const COLUMNS: &'static str;
    /// INSERT over the non-id columns in [`insert_params`](Self::insert_params)
    /// order, ending in `RETURNING id`.
    const INSERT_SQL: &'static str;
    /// Same as `INSERT_SQL` with the id bound first as `?1`.
    const INSERT_WITH_ID_SQL: &'static str;
    /// UPDATE over [`update_params`](Self::update_params), with the id bound
    /// last in the WHERE clause.
    const UPDATE_SQL: &'static str;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self::Entity>;
    fn insert_params(entity: &Self::Entity) -> Vec<Value>;
    fn update_params(entity: &Self::Entity) -> Vec<Value>;
    fn id_of(entity: &Self::Entity) -> Option<Self::Id>;
    fn assign_id(entity: &mut Self::Entity, id: Self::Id);
}

/// CRUD engine for one table.
///
/// Cheap to copy; holds only a borrow of the provider.
pub struct Repository<'p, B> {
    provider: &'p ConnectionProvider,
    binding: PhantomData<fn() -> B>,
}

impl<B> Clone for Repository<'_, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B> Copy for Repository<'_, B> {}

enum SaveWrite<Id> {
    Inserted(Id),
    Updated(Id),
}

impl<'p, B: EntityBinding> Repository<'p, B> {
    pub fn new(provider: &'p ConnectionProvider) -> Self {
        Self {
            provider,
            binding: PhantomData,
        }
    }

    pub fn find_by_id(&self, id: B::Id) -> RepoResult<Option<B::Entity>> {
        let sql = format!("SELECT {} FROM {} WHERE id = ?1", B::COLUMNS, B::TABLE);
        let found = self
            .with_conn(|conn| {
                let mut stmt = conn.prepare_cached(&sql)?;
                let mut rows = stmt.query([id])?;
                if let Some(row) = rows.next()? {
                    return Ok(Some(B::from_row(row)?));
                }
                Ok(None)
            })
            .soften_or_default("find_by_id", B::TABLE)?;
        debug!(
            "event=repo_find_by_id module=repo status=ok table={} id={} found={}",
            B::TABLE,
            id,
            found.is_some()
        );
        Ok(found)
    }

    /// Returns every row in store scan order.
    pub fn find_all(&self) -> RepoResult<Vec<B::Entity>> {
        let sql = format!("SELECT {} FROM {}", B::COLUMNS, B::TABLE);
        self.collect_rows(&sql, &[])
            .soften_or_default("find_all", B::TABLE)
    }

    pub fn delete_by_id(&self, id: B::Id) -> RepoResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", B::TABLE);
        let deleted = self
            .with_conn(|conn| conn.prepare_cached(&sql)?.execute([id]))
            .soften_or_default("delete_by_id", B::TABLE)?;
        if deleted > 0 {
            info!(
                "event=repo_delete_by_id module=repo status=ok table={} id={}",
                B::TABLE,
                id
            );
        }
        Ok(deleted > 0)
    }

    pub fn count(&self) -> RepoResult<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", B::TABLE);
        self.with_conn(|conn| {
            conn.prepare_cached(&sql)?
                .query_row([], |row| row.get::<_, u64>(0))
        })
        .soften_or_default("count", B::TABLE)
    }

    pub fn exists_by_id(&self, id: B::Id) -> RepoResult<bool> {
        self.with_conn(|conn| row_exists::<B>(conn, id))
            .soften_or_default("exists_by_id", B::TABLE)
    }

    /// Runs a caller-supplied SELECT and maps every row.
    ///
    /// `sql` must select [`EntityBinding::COLUMNS`]; `params` bind to `?1..`
    /// in order.
    pub fn execute_query(&self, sql: &str, params: &[&dyn ToSql]) -> RepoResult<Vec<B::Entity>> {
        self.collect_rows(sql, params)
            .soften_or_default("execute_query", B::TABLE)
    }

    /// Runs a caller-supplied write and returns the affected row count.
    pub fn execute_update(&self, sql: &str, params: &[&dyn ToSql]) -> RepoResult<usize> {
        self.with_conn(|conn| conn.prepare_cached(sql)?.execute(params))
            .soften_or_default("execute_update", B::TABLE)
    }

    /// Updates the row when `entity` carries an id that exists, otherwise
    /// inserts a new row and writes the generated id back.
    ///
    /// The existence check and the write share one `BEGIN IMMEDIATE`
    /// transaction, so concurrent saves of the same id cannot both insert.
    pub fn save(&self, mut entity: B::Entity) -> RepoResult<B::Entity> {
        let stamp = now();
        let written = self.with_conn(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let existing = match B::id_of(&entity) {
                Some(id) => stored_updated_at::<B>(&tx, id)?.map(|stored| (id, stored)),
                None => None,
            };

            let write = match existing {
                Some((id, stored)) => {
                    entity.mark_updated(next_update_stamp(stored, stamp));
                    update_row::<B>(&tx, &entity, id)?;
                    SaveWrite::Updated(id)
                }
                None => {
                    entity.mark_created(stamp);
                    SaveWrite::Inserted(insert_row::<B>(&tx, &entity)?)
                }
            };
            tx.commit()?;
            Ok(write)
        });

        match written.soften("save", B::TABLE)? {
            Some(SaveWrite::Inserted(id)) => {
                B::assign_id(&mut entity, id);
                info!(
                    "event=repo_save module=repo status=ok table={} action=insert id={}",
                    B::TABLE,
                    id
                );
            }
            Some(SaveWrite::Updated(id)) => {
                info!(
                    "event=repo_save module=repo status=ok table={} action=update id={}",
                    B::TABLE,
                    id
                );
            }
            None => {}
        }
        Ok(entity)
    }

    /// Inserts a new row, ignoring any id the value carries, and writes the
    /// store-assigned id back.
    pub fn insert(&self, mut entity: B::Entity) -> RepoResult<B::Entity> {
        entity.mark_created(now());
        let inserted = self
            .with_conn(|conn| insert_row::<B>(conn, &entity))
            .soften("insert", B::TABLE)?;
        if let Some(id) = inserted {
            B::assign_id(&mut entity, id);
            info!(
                "event=repo_insert module=repo status=ok table={} id={}",
                B::TABLE,
                id
            );
        }
        Ok(entity)
    }

    /// Rewrites every mutable column of the row keyed by the value's id.
    ///
    /// A value without an id, or whose id no longer exists, changes nothing.
    pub fn update(&self, mut entity: B::Entity) -> RepoResult<B::Entity> {
        let Some(id) = B::id_of(&entity) else {
            warn!(
                "event=repo_update module=repo status=skipped table={} reason=missing_id",
                B::TABLE
            );
            return Ok(entity);
        };

        let stamp = now();
        let changed = self
            .with_conn(|conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                let Some(stored) = stored_updated_at::<B>(&tx, id)? else {
                    return Ok(0);
                };
                entity.mark_updated(next_update_stamp(stored, stamp));
                let changed = update_row::<B>(&tx, &entity, id)?;
                tx.commit()?;
                Ok(changed)
            })
            .soften_or_default("update", B::TABLE)?;
        if changed > 0 {
            info!(
                "event=repo_update module=repo status=ok table={} id={}",
                B::TABLE,
                id
            );
        } else {
            debug!(
                "event=repo_update module=repo status=noop table={} id={}",
                B::TABLE,
                id
            );
        }
        Ok(entity)
    }

    /// Inserts a row that keeps the id and timestamps it was decoded with.
    ///
    /// Used when restoring seed or export files, so identifiers stay stable
    /// across loads. Values without an id fall back to [`insert`](Self::insert).
    /// Returns `None` when the store rejected the row.
    pub fn import(&self, entity: B::Entity) -> RepoResult<Option<B::Entity>> {
        let Some(id) = B::id_of(&entity) else {
            let stored = self.insert(entity)?;
            return Ok(B::id_of(&stored).is_some().then_some(stored));
        };

        let imported = self
            .with_conn(|conn| {
                let values = B::insert_params(&entity);
                let mut params: Vec<&dyn ToSql> = Vec::with_capacity(values.len() + 1);
                params.push(&id);
                params.extend(values.iter().map(|value| value as &dyn ToSql));
                conn.prepare_cached(B::INSERT_WITH_ID_SQL)?
                    .query_row(params.as_slice(), |row| row.get::<_, B::Id>(0))
            })
            .soften("import", B::TABLE)?;
        if imported.is_none() {
            return Ok(None);
        }
        info!(
            "event=repo_import module=repo status=ok table={} id={}",
            B::TABLE,
            id
        );
        Ok(Some(entity))
    }

    fn with_conn<T>(&self, op: impl FnOnce(&mut Connection) -> rusqlite::Result<T>) -> DbResult<T> {
        let mut conn = self.provider.acquire()?;
        Ok(op(&mut *conn)?)
    }

    fn collect_rows(&self, sql: &str, params: &[&dyn ToSql]) -> DbResult<Vec<B::Entity>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(sql)?;
            let rows = stmt.query_map(params, |row| B::from_row(row))?;
            let entities = rows.collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(entities)
        })
    }
}

fn row_exists<B: EntityBinding>(conn: &Connection, id: B::Id) -> rusqlite::Result<bool> {
    let sql = format!("SELECT 1 FROM {} WHERE id = ?1", B::TABLE);
    conn.prepare_cached(&sql)?.exists([id])
}

fn stored_updated_at<B: EntityBinding>(
    conn: &Connection,
    id: B::Id,
) -> rusqlite::Result<Option<NaiveDateTime>> {
    let sql = format!("SELECT updated_at FROM {} WHERE id = ?1", B::TABLE);
    conn.prepare_cached(&sql)?
        .query_row([id], |row| row.get(0))
        .optional()
}

fn insert_row<B: EntityBinding>(conn: &Connection, entity: &B::Entity) -> rusqlite::Result<B::Id> {
    conn.prepare_cached(B::INSERT_SQL)?
        .query_row(params_from_iter(B::insert_params(entity)), |row| row.get(0))
}

fn update_row<B: EntityBinding>(
    conn: &Connection,
    entity: &B::Entity,
    id: B::Id,
) -> rusqlite::Result<usize> {
    let values = B::update_params(entity);
    let mut params: Vec<&dyn ToSql> = values.iter().map(|value| value as &dyn ToSql).collect();
    params.push(&id);
    conn.prepare_cached(B::UPDATE_SQL)?.execute(params.as_slice())
}
