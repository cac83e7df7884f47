//! Owned, lazily opened SQLite handle for the metadata index.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use rusqlite::Connection;
use tracing::{debug, info};

use super::IndexError;

#[derive(Debug, Clone)]
enum Source {
    File(PathBuf),
    Memory,
}

enum State {
    Pending,
    Open(Connection),
    Closed,
}

/// Database handle shared by every request.
///
/// Opened on first use and reused afterwards. `schema` runs once per open.
/// After [`close`](Self::close) every access fails with [`IndexError::Closed`].
pub struct IndexConnection {
    source: Source,
    busy_timeout: Duration,
    schema: String,
    state: Mutex<State>,
}

impl IndexConnection {
    pub fn file(path: &Path, busy_timeout: Duration, schema: impl Into<String>) -> Self {
        Self::with_source(Source::File(path.to_path_buf()), busy_timeout, schema.into())
    }

    pub fn in_memory(schema: impl Into<String>) -> Self {
        Self::with_source(Source::Memory, Duration::from_secs(5), schema.into())
    }

    fn with_source(source: Source, busy_timeout: Duration, schema: String) -> Self {
        Self {
            source,
            busy_timeout,
            schema,
            state: Mutex::new(State::Pending),
        }
    }

    fn open(&self) -> Result<Connection, IndexError> {
        let conn = match &self.source {
            Source::File(path) => Connection::open(path),
            Source::Memory => Connection::open_in_memory(),
        }
        .map_err(|e| IndexError::Database(e.to_string()))?;

        conn.busy_timeout(self.busy_timeout)
            .map_err(|e| IndexError::Database(e.to_string()))?;
        conn.execute_batch(&self.schema)
            .map_err(|e| IndexError::Database(e.to_string()))?;

        info!(source = ?self.source, "Metadata index opened");
        Ok(conn)
    }

    /// Run `f` against the open connection, opening it first if needed.
    pub fn with<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, IndexError>,
    ) -> Result<T, IndexError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| IndexError::Database("index connection lock poisoned".to_string()))?;

        if let State::Pending = *state {
            *state = State::Open(self.open()?);
        }

        match &*state {
            State::Open(conn) => f(conn),
            _ => Err(IndexError::Closed),
        }
    }

    pub fn is_open(&self) -> bool {
        self.state
            .lock()
            .map(|state| matches!(*state, State::Open(_)))
            .unwrap_or(false)
    }

    /// Drop the handle. Idempotent.
    pub fn close(&self) -> Result<(), IndexError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| IndexError::Database("index connection lock poisoned".to_string()))?;

        if let State::Open(conn) = std::mem::replace(&mut *state, State::Closed) {
            conn.close()
                .map_err(|(_, e)| IndexError::Database(e.to_string()))?;
            debug!("Metadata index closed");
        }
        Ok(())
    }
}
