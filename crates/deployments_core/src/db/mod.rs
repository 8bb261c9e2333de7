//! Document storage bootstrap, sessions and collection primitives.
//!
//! # Responsibility
//! - Open and configure the SQLite-backed document database.
//! - Hand out one connection-scoped [`Session`] per storage operation.
//! - Classify driver errors into typed [`DbError`] variants.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Collections exist before any [`Database`] is returned to callers.
//! - "No matching document" is always [`DbError::NotFound`], never a
//!   message to compare against.

use rusqlite::ffi;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod collection;
pub mod keys;
pub mod migrations;
mod open;

pub use collection::{Collection, IndexSpec};
pub use open::{Database, Session};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// No document matched a point lookup, update or removal.
    NotFound,
    /// A write collided with a unique index or the primary key.
    DuplicateKey(String),
    Serialization(serde_json::Error),
    Io(std::io::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl DbError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Self::DuplicateKey(_))
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::NotFound => write!(f, "not found"),
            Self::DuplicateKey(details) => write!(f, "duplicate key: {details}"),
            Self::Serialization(err) => write!(f, "document serialization failed: {err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::NotFound | Self::DuplicateKey(_) | Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Self::NotFound,
            rusqlite::Error::SqliteFailure(code, message)
                if code.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                    || code.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                Self::DuplicateKey(message.unwrap_or_else(|| code.to_string()))
            }
            other => Self::Sqlite(other),
        }
    }
}

impl From<serde_json::Error> for DbError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

impl From<std::io::Error> for DbError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
