//! # rew-db
//!
//! libSQL storage for Rewind: the ledger record tables, the append-only
//! audit trail, and the undo engine that reverses logged mutations.
//!
//! Uses the `libsql` crate (C `SQLite` fork) — a local single-file
//! database is all the single-actor design needs, and SQLite rowid
//! tables give us explicit-identity re-insert for free, which undoing a
//! delete depends on.

pub mod error;
pub mod export;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod retention;
pub mod service;
pub mod undo;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;

/// Central database handle for all Rewind storage operations.
///
/// Wraps a libSQL database and connection; repository methods live on
/// [`service::RewindService`].
pub struct RewindDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl RewindDb {
    /// Open a local database at the given path (`":memory:"` for tests).
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        let rewind_db = Self { db, conn };
        rewind_db.run_migrations().await?;
        Ok(rewind_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }
}
