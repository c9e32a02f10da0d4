//! Persistence gateway for tally.
//!
//! Owns the process-wide SQLite connection and exposes typed per-entity
//! operations. Field rules and the credential pipeline are applied here, on
//! the write path itself; callers hand over plaintext input and never
//! pre-hash. Every error crosses this boundary as [`StoreError`] — raw
//! driver errors do not escape the crate.

pub mod error;
pub mod models;
pub mod queries;
pub mod schema;
pub mod validate;

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::info;

pub use error::StoreError;

pub type Result<T> = std::result::Result<T, StoreError>;

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (creating if needed) the database at `path` and apply the
    /// registered schema. Called once at process startup; the returned
    /// handle is shared for the life of the process.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self::init(conn)?;
        info!("database opened at {}", path.display());
        Ok(db)
    }

    /// Private in-memory database, for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        schema::apply(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::Internal("connection lock poisoned".into()))?;
        f(&conn)
    }

    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::Internal("connection lock poisoned".into()))?;
        f(&mut conn)
    }
}
