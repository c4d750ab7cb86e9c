//! A small round-robin pool of read-only connections so concurrent queries
//! don't serialize behind the single writer. WAL mode makes readers
//! non-blocking against an in-flight write.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rusqlite::{Connection, OpenFlags};

use cortex_core::errors::{CortexError, CortexResult, StorageError};

use super::pragmas::apply_read_pragmas;
use crate::to_storage_err;

pub struct ReadPool {
    conns: Vec<Mutex<Connection>>,
    next: AtomicUsize,
}

impl ReadPool {
    pub fn open(path: &std::path::Path, size: usize) -> CortexResult<Self> {
        let size = size.max(1);
        let mut conns = Vec::with_capacity(size);
        for _ in 0..size {
            let conn = Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI,
            )
            .map_err(|e| to_storage_err(e.to_string()))?;
            apply_read_pragmas(&conn)?;
            conns.push(Mutex::new(conn));
        }
        Ok(Self { conns, next: AtomicUsize::new(0) })
    }

    /// Run `f` against the next connection in round-robin order. Returns
    /// `ConnectionPoolExhausted` if every connection is already held by a
    /// panicked thread (mutex poisoned) — callers treat this as retryable.
    pub fn with_reader<T>(
        &self,
        f: impl FnOnce(&Connection) -> CortexResult<T>,
    ) -> CortexResult<T> {
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.conns.len();
        let conn = self.conns[idx].lock().map_err(|_| {
            CortexError::Storage(StorageError::ConnectionPoolExhausted {
                active_connections: self.conns.len(),
            })
        })?;
        f(&conn)
    }

    pub fn size(&self) -> usize {
        self.conns.len()
    }
}
