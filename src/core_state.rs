//! Shared application state.
//!
//! `CoreState` owns the single SQLite connection behind a `Mutex`. Handlers
//! borrow it for the length of one workflow call, so each request runs as
//! one unit against the store. Tests build a `CoreState` over an in-memory
//! database instead of touching the user's data directory.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;

use crate::db;

pub struct CoreState {
    db: Mutex<Connection>,
}

impl CoreState {
    /// Wrap an already-migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Mutex::new(conn),
        }
    }

    /// Open (or create) the database file and run migrations.
    pub fn open(path: &Path) -> Result<Self, CoreError> {
        let conn = db::open_database(path)?;
        tracing::info!(path = %path.display(), "Intake database opened");
        Ok(Self::new(conn))
    }

    /// Fresh in-memory store (for testing and demos).
    pub fn in_memory() -> Result<Self, CoreError> {
        Ok(Self::new(db::open_memory_database()?))
    }

    /// Borrow the connection for one operation.
    pub fn lock_db(&self) -> Result<MutexGuard<'_, Connection>, CoreError> {
        self.db.lock().map_err(|_| CoreError::LockPoisoned)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_state_is_migrated() {
        let core = CoreState::in_memory().unwrap();
        let conn = core.lock_db().unwrap();
        assert_eq!(db::count_tables(&conn).unwrap(), 3);
    }

    #[test]
    fn open_creates_database_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("intake.db");
        let core = CoreState::open(&path).unwrap();
        drop(core);
        assert!(path.exists());
    }

    #[test]
    fn lock_is_reusable_after_release() {
        let core = CoreState::in_memory().unwrap();
        {
            let _guard = core.lock_db().unwrap();
        }
        assert!(core.lock_db().is_ok());
    }
}
