use crate::error::app_error::AppError;
use sqlx::{Sqlite, SqlitePool, Transaction};

#[derive(Clone)]
pub struct SqliteRepository {
    pub pool: SqlitePool,
}

impl SqliteRepository {
    /// Opens a transaction that takes SQLite's write lock immediately.
    /// Concurrent writers wait on the busy timeout instead of failing to
    /// upgrade a read lock with `SQLITE_BUSY`.
    pub(crate) async fn begin_write(&self) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
        self.pool.begin_with("BEGIN IMMEDIATE").await
    }
}

pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

/// Maps a `UNIQUE` constraint failure to the domain conflict it stands for.
/// The store's constraint is the source of truth; the existence checks done
/// before inserting only exist to produce the message without an error round trip.
pub(crate) fn conflict_or_db(e: sqlx::Error, context: &str, conflict: impl FnOnce() -> AppError) -> AppError {
    if is_unique_violation(&e) { conflict() } else { AppError::db(context, e) }
}
