//! Shared application state.
//!
//! Holds the database path; each request opens its own connection and
//! the store provides the only consistency guarantees.

use std::path::PathBuf;

use rusqlite::Connection;

use crate::db::sqlite::open_database;
use crate::db::DatabaseError;

#[derive(Debug, Clone)]
pub struct AppState {
    db_path: PathBuf,
}

impl AppState {
    pub fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }

    /// Open a fresh connection to the service database. Pragmas are set
    /// per connection; the migration check is a no-op once current.
    pub fn open_db(&self) -> Result<Connection, DatabaseError> {
        open_database(&self.db_path)
    }

    pub fn db_path(&self) -> &PathBuf {
        &self.db_path
    }
}
