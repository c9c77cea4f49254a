//! Connection handling: pragmas, the read pool, and `DatabaseManager`.
//!
//! One writer connection behind a `Mutex` plus a checkout pool of
//! read-only connections. The only place in the crate that holds raw
//! `Connection`s; everything else goes through `with_reader` /
//! `with_writer`.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use larder_core::{LarderResult, StorageError};

use crate::migrations;
use crate::to_storage_err;

/// Reader connections created when the caller passes a size of 0.
const DEFAULT_POOL_SIZE: usize = 4;

/// Hard ceiling on reader connections.
const MAX_POOL_SIZE: usize = 8;

/// How long a read waits for a pooled connection before giving up.
const CHECKOUT_TIMEOUT: Duration = Duration::from_secs(5);

/// Configure a connection with the PRAGMAs every larder connection
/// runs under.
///
/// - WAL for concurrent readers during writes
/// - busy_timeout for lock contention
/// - NORMAL synchronous for the WAL durability trade-off
pub fn configure_connection(conn: &Connection) -> LarderResult<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = 5000;
        PRAGMA cache_size = -8000;
        PRAGMA temp_store = MEMORY;
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Same PRAGMAs plus `query_only = ON` so a pooled reader can never
/// write, whatever SQL reaches it.
pub fn configure_readonly_connection(conn: &Connection) -> LarderResult<()> {
    configure_connection(conn)?;
    conn.execute_batch("PRAGMA query_only = ON;")
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

// ─── ReadPool ────────────────────────────────────────────────────────

/// Checkout pool of read-only connections.
///
/// Connections live in a bounded channel; `with_conn` checks one out,
/// runs the closure, and returns it. A full pool under load surfaces
/// as `PoolExhausted` after the checkout timeout instead of blocking
/// forever.
pub struct ReadPool {
    tx: Sender<Connection>,
    rx: Receiver<Connection>,
    size: usize,
}

impl ReadPool {
    /// Open `size` read-only connections against an existing database
    /// file. A size of 0 means the default; anything above the ceiling
    /// is clamped.
    pub fn open(path: &Path, size: usize) -> LarderResult<Self> {
        let size = if size == 0 { DEFAULT_POOL_SIZE } else { size };
        let size = size.min(MAX_POOL_SIZE);

        let (tx, rx) = bounded(size);
        for i in 0..size {
            let conn = Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .map_err(|e| to_storage_err(format!("open reader {i}: {e}")))?;
            configure_readonly_connection(&conn)?;
            // Channel is sized to hold the whole pool.
            tx.send(conn)
                .map_err(|_| StorageError::PoolClosed)?;
        }

        debug!(size, path = %path.display(), "read pool open");
        Ok(Self { tx, rx, size })
    }

    /// Number of pooled connections.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Pool size used when the caller doesn't pick one.
    pub fn default_size() -> usize {
        DEFAULT_POOL_SIZE
    }

    /// Run a closure with a checked-out reader connection.
    pub fn with_conn<F, T>(&self, f: F) -> LarderResult<T>
    where
        F: FnOnce(&Connection) -> LarderResult<T>,
    {
        let conn = self.rx.recv_timeout(CHECKOUT_TIMEOUT).map_err(|e| match e {
            RecvTimeoutError::Timeout => StorageError::PoolExhausted,
            RecvTimeoutError::Disconnected => StorageError::PoolClosed,
        })?;
        let result = f(&conn);
        let _ = self.tx.send(conn);
        result
    }
}

// ─── DatabaseManager ─────────────────────────────────────────────────

/// Read/write routing over one writer connection and a read pool.
///
/// Opening runs pragmas and all pending migrations. In-memory mode has
/// no pool: a separate in-memory connection would see its own private
/// database, so reads route through the writer instead.
pub struct DatabaseManager {
    writer: Mutex<Connection>,
    readers: Option<ReadPool>,
    path: Option<PathBuf>,
}

impl DatabaseManager {
    /// Open a file-backed database with `pool_size` readers
    /// (0 = default).
    pub fn open(path: &Path, pool_size: usize) -> LarderResult<Self> {
        let writer = Connection::open(path)
            .map_err(|e| to_storage_err(format!("open writer {}: {e}", path.display())))?;
        configure_connection(&writer)?;
        migrations::run_migrations(&writer)?;

        // Readers open read-only, so the file must exist first.
        let readers = ReadPool::open(path, pool_size)?;

        debug!(path = %path.display(), "database open");
        Ok(Self {
            writer: Mutex::new(writer),
            readers: Some(readers),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory database (for testing). All reads route
    /// through the writer.
    pub fn open_in_memory() -> LarderResult<Self> {
        let writer = Connection::open_in_memory()
            .map_err(|e| to_storage_err(format!("open in-memory writer: {e}")))?;
        configure_connection(&writer)?;
        migrations::run_migrations(&writer)?;

        Ok(Self {
            writer: Mutex::new(writer),
            readers: None,
            path: None,
        })
    }

    /// Database file path (None for in-memory).
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run a closure with the writer connection.
    pub fn with_writer<F, T>(&self, f: F) -> LarderResult<T>
    where
        F: FnOnce(&Connection) -> LarderResult<T>,
    {
        let conn = self.writer.lock().map_err(|e| StorageError::LockPoisoned {
            message: e.to_string(),
        })?;
        f(&conn)
    }

    /// Run a closure with a pooled reader, falling back to the writer
    /// in in-memory mode.
    pub fn with_reader<F, T>(&self, f: F) -> LarderResult<T>
    where
        F: FnOnce(&Connection) -> LarderResult<T>,
    {
        match &self.readers {
            Some(pool) => pool.with_conn(f),
            None => self.with_writer(f),
        }
    }

    /// Truncate the WAL into the main database file.
    pub fn checkpoint(&self) -> LarderResult<()> {
        self.with_writer(|conn| {
            // wal_checkpoint returns a (busy, log, checkpointed) row.
            conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_row| Ok(()))
                .map_err(|e| to_storage_err(e.to_string()))?;
            Ok(())
        })
    }
}
