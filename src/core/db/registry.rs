/// Connection Registry Module
///
/// This module owns the live engine handles, keyed by database path.
/// A path is opened lazily on first use, reused for every subsequent
/// operation on that path, and closed explicitly or at shutdown. The
/// registry map is the only shared mutable state in the core.

use crate::core::{DbPeekError, Result};
use once_cell::sync::Lazy;
use rusqlite::{Connection, OpenFlags};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error};

/// Non-owning capability handle to a registered connection.
///
/// The registry keeps one clone per path; callers hold further clones and
/// lock the inner mutex for the duration of a single operation.
pub type SharedConnection = Arc<Mutex<Connection>>;

/// Process-wide default registry, mirroring the lazy singleton used for
/// shared database state elsewhere in the stack.
static GLOBAL_REGISTRY: Lazy<ConnectionRegistry> = Lazy::new(ConnectionRegistry::new);

/// Registry of open database connections, at most one per path.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: Mutex<HashMap<PathBuf, SharedConnection>>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        ConnectionRegistry {
            connections: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the process-wide registry instance.
    pub fn global() -> &'static ConnectionRegistry {
        &GLOBAL_REGISTRY
    }

    /// Opens (or reuses) the connection for `path`.
    ///
    /// If a live connection for the path already exists it is returned
    /// as-is; a second `open` on the same path always yields the identical
    /// handle. Otherwise a new engine handle is opened in read-write mode
    /// with foreign-key enforcement enabled, registered, and returned.
    ///
    /// The open happens without the CREATE flag, so a missing file is a
    /// `Connection` error rather than a silently materialized empty
    /// database.
    ///
    /// The registry lock is held across the underlying open; two
    /// concurrent openers of the same unopened path can never produce two
    /// handles.
    pub fn open(&self, path: impl AsRef<Path>) -> Result<SharedConnection> {
        let path = path.as_ref();
        let mut map = self.lock_map()?;

        if let Some(existing) = map.get(path) {
            return Ok(Arc::clone(existing));
        }

        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_WRITE)
            .map_err(|e| {
                DbPeekError::Connection(format!("failed to open {}: {}", path.display(), e))
            })?;
        conn.execute_batch("PRAGMA foreign_keys = ON;").map_err(|e| {
            DbPeekError::Connection(format!("failed to configure {}: {}", path.display(), e))
        })?;

        debug!("opened connection for {}", path.display());
        let shared: SharedConnection = Arc::new(Mutex::new(conn));
        map.insert(path.to_path_buf(), Arc::clone(&shared));
        Ok(shared)
    }

    /// Closes and deregisters the connection for `path`; no-op if the
    /// path is untracked.
    ///
    /// The entry is removed before the underlying close is attempted, so
    /// a failing close (surfaced as `Connection`) still leaves the
    /// registry consistent.
    pub fn close(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let removed = self.lock_map()?.remove(path);
        match removed {
            Some(shared) => Self::shutdown(path, shared),
            None => Ok(()),
        }
    }

    /// Closes every tracked connection; used at shutdown.
    ///
    /// Individual close failures are logged, not propagated, so remaining
    /// connections still get closed.
    pub fn close_all(&self) {
        let drained: Vec<(PathBuf, SharedConnection)> = match self.lock_map() {
            Ok(mut map) => map.drain().collect(),
            Err(e) => {
                error!("close_all could not lock the registry: {}", e);
                return;
            }
        };

        for (path, shared) in drained {
            if let Err(e) = Self::shutdown(&path, shared) {
                error!("close_all: {}", e);
            }
        }
    }

    /// Reports whether a connection for `path` is currently registered.
    pub fn is_open(&self, path: impl AsRef<Path>) -> bool {
        self.lock_map()
            .map(|map| map.contains_key(path.as_ref()))
            .unwrap_or(false)
    }

    fn shutdown(path: &Path, shared: SharedConnection) -> Result<()> {
        match Arc::try_unwrap(shared) {
            Ok(mutex) => {
                let conn = mutex
                    .into_inner()
                    .map_err(|_| DbPeekError::App("connection lock poisoned".to_string()))?;
                conn.close().map_err(|(_, e)| {
                    DbPeekError::Connection(format!("failed to close {}: {}", path.display(), e))
                })?;
                debug!("closed connection for {}", path.display());
                Ok(())
            }
            Err(_) => {
                // A caller still holds the handle; the engine handle is
                // released when the last clone drops.
                debug!(
                    "connection for {} still referenced, deferring close",
                    path.display()
                );
                Ok(())
            }
        }
    }

    fn lock_map(&self) -> Result<MutexGuard<'_, HashMap<PathBuf, SharedConnection>>> {
        self.connections
            .lock()
            .map_err(|_| DbPeekError::App("registry lock poisoned".to_string()))
    }
}
