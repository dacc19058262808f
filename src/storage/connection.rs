//! Connection handle
//!
//! A [`Database`] is passed explicitly to whatever needs storage. Every call
//! through [`Database::with_connection`] opens its own connection, runs, and
//! drops it before returning, on success and on failure alike.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rusqlite::Connection;

use super::schema;
use crate::Result;

static MEMORY_DATABASES: AtomicUsize = AtomicUsize::new(0);

pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
enum Target {
    File(PathBuf),
    /// Named shared-cache URI, so every connection sees the same data
    Memory(String),
}

/// Source of scoped SQLite connections
#[derive(Debug, Clone)]
pub struct Database {
    target: Target,
    busy_timeout: Duration,
    /// Keeps a shared in-memory database alive between calls
    _anchor: Option<Arc<Mutex<Connection>>>,
}

impl Database {
    /// Open a database file (creates it and its directory if needed)
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = Self {
            target: Target::File(path),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            _anchor: None,
        };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Open a private in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let n = MEMORY_DATABASES.fetch_add(1, Ordering::Relaxed);
        let uri = format!("file:clubstore-{}-{}?mode=memory&cache=shared", std::process::id(), n);
        let anchor = Connection::open(&uri)?;

        let db = Self {
            target: Target::Memory(uri),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            _anchor: Some(Arc::new(Mutex::new(anchor))),
        };
        db.initialize_schema()?;
        Ok(db)
    }

    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Database file path, `None` for in-memory databases
    pub fn path(&self) -> Option<&Path> {
        match &self.target {
            Target::File(path) => Some(path),
            Target::Memory(_) => None,
        }
    }

    /// Run `op` on a fresh connection.
    ///
    /// A connectivity failure (cannot open, I/O error, busy) gets exactly one
    /// reconnect and retry. Transactions opened by `op` roll back when the
    /// failed attempt's connection is dropped, so the retry starts clean.
    pub fn with_connection<T, F>(&self, mut op: F) -> Result<T>
    where
        F: FnMut(&mut Connection) -> Result<T>,
    {
        match self.attempt(&mut op) {
            Err(err) if err.is_connectivity() => {
                tracing::warn!(error = %err, "Database connection failed, reconnecting once");
                self.attempt(&mut op)
            }
            result => result,
        }
    }

    fn attempt<T, F>(&self, op: &mut F) -> Result<T>
    where
        F: FnMut(&mut Connection) -> Result<T>,
    {
        let mut conn = self.connect()?;
        op(&mut conn)
    }

    fn connect(&self) -> Result<Connection> {
        let conn = match &self.target {
            Target::File(path) => Connection::open(path)?,
            Target::Memory(uri) => Connection::open(uri)?,
        };
        conn.busy_timeout(self.busy_timeout)?;
        conn.execute_batch(schema::CONNECTION_PRAGMAS)?;
        Ok(conn)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        self.with_connection(|conn| {
            let tx = conn.transaction()?;
            for stmt in schema::all_schema_statements() {
                tx.execute(stmt, [])?;
            }
            tx.commit()?;
            Ok(())
        })
    }
}
