pub mod pragmas;
pub mod read_pool;
pub mod write_connection;

pub use pragmas::{apply_pragmas, apply_read_pragmas, verify_wal_mode};
pub use read_pool::ReadPool;
pub use write_connection::WriteConnection;

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use cortex_core::errors::CortexResult;

/// Default size of the round-robin read pool.
const DEFAULT_READER_COUNT: usize = 4;

pub struct ConnectionPool {
    pub writer: WriteConnection,
    readers: Option<ReadPool>,
    pub db_path: Option<PathBuf>,
}

impl ConnectionPool {
    pub fn open(path: &Path) -> CortexResult<Self> {
        let writer = WriteConnection::open(path)?;
        let readers = ReadPool::open(path, DEFAULT_READER_COUNT)?;
        Ok(Self { writer, readers: Some(readers), db_path: Some(path.to_path_buf()) })
    }

    /// An in-memory database lives only inside the writer's connection —
    /// there is no file to reopen read-only against, and no second
    /// in-memory handle would see the same data. Reads route through the
    /// writer instead of through a separate pool.
    pub fn open_in_memory() -> CortexResult<Self> {
        let writer = WriteConnection::open_in_memory()?;
        Ok(Self { writer, readers: None, db_path: None })
    }

    pub fn with_reader<T>(
        &self,
        f: impl FnOnce(&Connection) -> CortexResult<T>,
    ) -> CortexResult<T> {
        match &self.readers {
            Some(pool) => pool.with_reader(f),
            None => self.writer.with_conn_sync(f),
        }
    }
}
