//! Database handles and connection-scoped sessions.
//!
//! # Responsibility
//! - Open file or in-memory (`memdb` VFS) document databases.
//! - Trigger schema migrations before returning a usable [`Database`].
//! - Open one fresh connection per [`Session`] and close it on drop.
//!
//! # Invariants
//! - Returned databases have migrations fully applied.
//! - A [`Session`] is released on every exit path of its owner, including
//!   `?` early returns.

use super::collection::Collection;
use super::keys::DATABASE_NAME;
use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info, trace};
use rusqlite::{Connection, OpenFlags};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use uuid::Uuid;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
enum Location {
    File(PathBuf),
    /// `memdb` VFS URI; sessions lock like file databases and honour the
    /// busy timeout. The anchor connection keeps the database alive while no
    /// session is open.
    Memory {
        uri: String,
        _anchor: Mutex<Connection>,
    },
}

impl Location {
    fn mode(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Memory { .. } => "memory",
        }
    }
}

/// Handle to an opened document database.
///
/// Cloning is cheap; clones share the same open target. The handle holds no
/// connection of its own for file databases, every operation goes through
/// [`Database::session`].
#[derive(Debug, Clone)]
pub struct Database {
    location: Arc<Location>,
}

impl Database {
    /// Opens a database file and applies all pending migrations.
    ///
    /// # Side effects
    /// - Emits `db_open` logging events with duration and status.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref().to_path_buf();
        let started_at = Instant::now();
        info!("event=db_open module=db status=start mode=file");

        let result = Connection::open(&path)
            .map_err(DbError::from)
            .and_then(|mut conn| bootstrap_connection(&mut conn));
        log_open_result("file", started_at, &result);
        result?;

        Ok(Self {
            location: Arc::new(Location::File(path)),
        })
    }

    /// Opens `<dir>/deployment_service.db`, creating `dir` when missing.
    pub fn open_in_dir(dir: impl AsRef<Path>) -> DbResult<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        Self::open(dir.join(format!("{DATABASE_NAME}.db")))
    }

    /// Opens a private in-memory database and applies all migrations.
    ///
    /// Every call yields a distinct database; sessions opened from the same
    /// handle share it.
    pub fn open_in_memory() -> DbResult<Self> {
        let uri = format!(
            "file:/{DATABASE_NAME}-{}?vfs=memdb",
            Uuid::new_v4().simple()
        );
        let started_at = Instant::now();
        info!("event=db_open module=db status=start mode=memory");

        let result = open_connection(&uri).and_then(|mut conn| {
            bootstrap_connection(&mut conn)?;
            Ok(conn)
        });
        log_open_result("memory", started_at, &result);
        let anchor = result?;

        Ok(Self {
            location: Arc::new(Location::Memory {
                uri,
                _anchor: Mutex::new(anchor),
            }),
        })
    }

    /// Opens a dedicated connection for one storage operation.
    pub fn session(&self) -> DbResult<Session> {
        let conn = match self.location.as_ref() {
            Location::File(path) => Connection::open(path)?,
            Location::Memory { uri, .. } => open_connection(uri)?,
        };
        conn.busy_timeout(BUSY_TIMEOUT)?;
        trace!(
            "event=session_open module=db mode={}",
            self.location.mode()
        );
        Ok(Session {
            conn,
            opened_at: Instant::now(),
        })
    }
}

/// Connection scoped to a single storage operation.
///
/// Dropping the session closes the connection.
#[derive(Debug)]
pub struct Session {
    conn: Connection,
    opened_at: Instant,
}

impl Session {
    /// Returns the named collection bound to this session.
    pub fn collection<'s>(&'s self, name: &'s str) -> Collection<'s> {
        Collection::new(&self.conn, name)
    }
}

impl Deref for Session {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        trace!(
            "event=session_close module=db duration_ms={}",
            self.opened_at.elapsed().as_millis()
        );
    }
}

fn open_connection(uri: &str) -> DbResult<Connection> {
    Ok(Connection::open_with_flags(uri, OpenFlags::default())?)
}

fn bootstrap_connection(conn: &mut Connection) -> DbResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn)?;
    Ok(())
}

fn log_open_result<T>(mode: &str, started_at: Instant, result: &DbResult<T>) {
    match result {
        Ok(_) => info!(
            "event=db_open module=db status=ok mode={} duration_ms={}",
            mode,
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
            mode,
            started_at.elapsed().as_millis(),
            err
        ),
    }
}
