//! Service layer orchestrating record mutations with the audit trail.
//!
//! `RewindService` wraps `RewindDb` and carries the retention limit. All
//! repo methods are implemented as `impl RewindService` blocks in the
//! modules that own them (`repos::audit`, `repos::records`, `undo`,
//! `retention`, `export`).
//!
//! Every logged mutation follows this protocol:
//! 1. Begin transaction
//! 2. Execute the record SQL
//! 3. Append the audit entry (inside the transaction)
//! 4. Enforce retention (inside the transaction)
//! 5. Commit
//!
//! If any step fails the transaction rolls back as a whole — a record
//! change with no audit entry would be unrecoverable, and an audit entry
//! for a change that didn't happen would be misleading.

use crate::RewindDb;
use crate::error::DatabaseError;

/// Orchestrates record mutations, audit logging, undo, and export.
pub struct RewindService {
    db: RewindDb,
    max_entries: u32,
}

impl RewindService {
    /// Open a service over a local database.
    ///
    /// # Arguments
    ///
    /// * `db_path` — Path to the libSQL database file, or `":memory:"`.
    /// * `max_entries` — Retention window size (entries kept in the
    ///   trail; see `retention`).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str, max_entries: u32) -> Result<Self, DatabaseError> {
        let db = RewindDb::open_local(db_path).await?;
        Ok(Self { db, max_entries })
    }

    /// Create from an existing `RewindDb` (for testing).
    #[must_use]
    pub const fn from_db(db: RewindDb, max_entries: u32) -> Self {
        Self { db, max_entries }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &RewindDb {
        &self.db
    }

    /// The retention window size.
    #[must_use]
    pub const fn max_entries(&self) -> u32 {
        self.max_entries
    }
}
