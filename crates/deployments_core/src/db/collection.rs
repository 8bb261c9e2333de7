//! Document collection primitives over a single session.
//!
//! # Responsibility
//! - Store serde documents as JSON keyed by `_id`.
//! - Resolve dotted document keys to SQLite JSON path expressions.
//! - Create named expression indexes over document keys.
//!
//! # Invariants
//! - Lookups, updates and removals that match nothing return
//!   [`DbError::NotFound`].
//! - Filters and indexes use identical key expressions, so equality lookups
//!   on indexed keys are served by the index.

use super::keys::STORAGE_KEY_SOFTWARE_IMAGE_ID;
use super::{DbError, DbResult};
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Index definition over dotted document keys.
#[derive(Debug, Clone, Copy)]
pub struct IndexSpec<'a> {
    pub name: &'a str,
    pub keys: &'a [&'a str],
    pub unique: bool,
}

/// Named collection bound to a session connection.
#[derive(Debug, Clone, Copy)]
pub struct Collection<'s> {
    conn: &'s Connection,
    name: &'s str,
}

impl<'s> Collection<'s> {
    pub(crate) fn new(conn: &'s Connection, name: &'s str) -> Self {
        Self { conn, name }
    }

    /// Fetches the document stored under `id`.
    pub fn find_id<T: DeserializeOwned>(&self, id: &str) -> DbResult<T> {
        let doc: String = self.conn.query_row(
            &format!("SELECT doc FROM {} WHERE _id = ?1;", quote_ident(self.name)),
            [id],
            |row| row.get(0),
        )?;
        Ok(serde_json::from_str(&doc)?)
    }

    /// Returns whether a document is stored under `id`.
    pub fn contains_id(&self, id: &str) -> DbResult<bool> {
        let found = self
            .conn
            .query_row(
                &format!("SELECT 1 FROM {} WHERE _id = ?1;", quote_ident(self.name)),
                [id],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Fetches the first document whose keys equal all `filter` values.
    pub fn find_one<T: DeserializeOwned>(&self, filter: &[(&str, &str)]) -> DbResult<T> {
        let mut sql = format!("SELECT doc FROM {} WHERE 1 = 1", quote_ident(self.name));
        for (position, (key, _)) in filter.iter().enumerate() {
            sql.push_str(&format!(" AND {} = ?{}", key_expr(key), position + 1));
        }
        sql.push_str(" LIMIT 1;");

        let doc: String = self.conn.query_row(
            &sql,
            params_from_iter(filter.iter().map(|(_, value)| *value)),
            |row| row.get(0),
        )?;
        Ok(serde_json::from_str(&doc)?)
    }

    /// Fetches every document in `_id` order.
    pub fn find_all<T: DeserializeOwned>(&self) -> DbResult<Vec<T>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT doc FROM {} ORDER BY _id ASC;",
            quote_ident(self.name)
        ))?;
        let mut rows = stmt.query([])?;
        let mut docs = Vec::new();

        while let Some(row) = rows.next()? {
            let doc: String = row.get(0)?;
            docs.push(serde_json::from_str(&doc)?);
        }

        Ok(docs)
    }

    /// Inserts a new document under `id`.
    ///
    /// Collisions with the primary key or a unique index surface as
    /// [`DbError::DuplicateKey`].
    pub fn insert<T: Serialize>(&self, id: &str, doc: &T) -> DbResult<()> {
        let doc = serde_json::to_string(doc)?;
        self.conn.execute(
            &format!(
                "INSERT INTO {} (_id, doc) VALUES (?1, ?2);",
                quote_ident(self.name)
            ),
            [id, doc.as_str()],
        )?;
        Ok(())
    }

    /// Replaces the document stored under `id`.
    pub fn update_id<T: Serialize>(&self, id: &str, doc: &T) -> DbResult<()> {
        let doc = serde_json::to_string(doc)?;
        let changed = self.conn.execute(
            &format!("UPDATE {} SET doc = ?1 WHERE _id = ?2;", quote_ident(self.name)),
            [doc.as_str(), id],
        )?;

        if changed == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }

    /// Removes the document stored under `id`.
    pub fn remove_id(&self, id: &str) -> DbResult<()> {
        let changed = self.conn.execute(
            &format!("DELETE FROM {} WHERE _id = ?1;", quote_ident(self.name)),
            [id],
        )?;

        if changed == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }

    /// Creates `index` unless an index with the same name already exists.
    ///
    /// The index is built synchronously; existing duplicates make a unique
    /// index fail with [`DbError::DuplicateKey`].
    pub fn ensure_index(&self, index: &IndexSpec<'_>) -> DbResult<()> {
        let keys = index
            .keys
            .iter()
            .map(|key| key_expr(key))
            .collect::<Vec<_>>()
            .join(", ");
        let unique = if index.unique { "UNIQUE " } else { "" };

        self.conn.execute_batch(&format!(
            "CREATE {unique}INDEX IF NOT EXISTS {} ON {} ({keys});",
            quote_ident(index.name),
            quote_ident(self.name)
        ))?;
        Ok(())
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Maps a dotted document key to the SQL expression reading it.
fn key_expr(key: &str) -> String {
    if key == STORAGE_KEY_SOFTWARE_IMAGE_ID {
        return STORAGE_KEY_SOFTWARE_IMAGE_ID.to_string();
    }
    format!("json_extract(doc, '$.{}')", key.replace('\'', "''"))
}
