//! The single writer connection. SQLite allows only one writer at a time;
//! rather than contend on the database file lock, every write funnels
//! through one `Connection` behind a `Mutex` so callers block in-process
//! instead of spinning on `SQLITE_BUSY`.

use std::sync::Mutex;

use rusqlite::Connection;

use cortex_core::errors::CortexResult;

use super::pragmas::apply_pragmas;
use crate::to_storage_err;

pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    pub fn open(path: &std::path::Path) -> CortexResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn open_in_memory() -> CortexResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Run `f` against the writer under the lock. `f` is responsible for
    /// wrapping multi-statement work in a transaction or savepoint.
    pub fn with_conn_sync<T>(
        &self,
        f: impl FnOnce(&Connection) -> CortexResult<T>,
    ) -> CortexResult<T> {
        let conn = self.conn.lock().map_err(|_| to_storage_err("writer mutex poisoned"))?;
        f(&conn)
    }

    /// Run `f` inside a named SAVEPOINT, committing on `Ok` and rolling
    /// back on `Err`. Nested calls from within `f` would deadlock on the
    /// same lock, so `f` must not re-enter `with_conn_sync`/`with_savepoint`.
    pub fn with_savepoint<T>(
        &self,
        name: &str,
        f: impl FnOnce(&Connection) -> CortexResult<T>,
    ) -> CortexResult<T> {
        self.with_conn_sync(|conn| {
            conn.execute_batch(&format!("SAVEPOINT {name}"))
                .map_err(|e| to_storage_err(e.to_string()))?;
            match f(conn) {
                Ok(value) => {
                    conn.execute_batch(&format!("RELEASE {name}"))
                        .map_err(|e| to_storage_err(e.to_string()))?;
                    Ok(value)
                }
                Err(e) => {
                    let _ = conn.execute_batch(&format!("ROLLBACK TO {name}; RELEASE {name}"));
                    Err(e)
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn savepoint_rolls_back_on_error() {
        let w = WriteConnection::open_in_memory().unwrap();
        w.with_conn_sync(|conn| {
            conn.execute_batch("CREATE TABLE t (v INTEGER)").unwrap();
            Ok(())
        })
        .unwrap();

        let result: CortexResult<()> = w.with_savepoint("sp1", |conn| {
            conn.execute("INSERT INTO t (v) VALUES (1)", []).unwrap();
            Err(to_storage_err("forced failure"))
        });
        assert!(result.is_err());

        let count: i64 = w
            .with_conn_sync(|conn| {
                conn.query_row("SELECT COUNT(*) FROM t", [], |r| r.get(0))
                    .map_err(|e| to_storage_err(e.to_string()))
            })
            .unwrap();
        assert_eq!(count, 0);
    }
}
