//! Key-value byte store for raw uploaded files.
//!
//! Keys are path-like strings (`user_{uid}/project_{pid}/{filename}`).
//! No versioning and no multi-key transactions; a put overwrites.

use rusqlite::{OptionalExtension, params};

use crate::{StorageError, store::Store};

impl Store {
    /// Store bytes under a key, overwriting any existing value.
    pub fn put_object(&self, key: &str, data: &[u8]) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO objects (key, data) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET data = excluded.data",
            params![key, data],
        )?;
        Ok(())
    }

    pub fn get_object(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let row = self
            .conn
            .query_row(
                "SELECT data FROM objects WHERE key = ?1",
                params![key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(row)
    }

    /// Delete one object. Returns whether a value was present.
    pub fn delete_object(&self, key: &str) -> Result<bool, StorageError> {
        let n = self
            .conn
            .execute("DELETE FROM objects WHERE key = ?1", params![key])?;
        Ok(n > 0)
    }

    /// Delete every object whose key starts with `prefix`.
    pub fn delete_objects_with_prefix(&self, prefix: &str) -> Result<usize, StorageError> {
        let pattern = format!("{}%", prefix.replace('%', "\\%").replace('_', "\\_"));
        let n = self.conn.execute(
            "DELETE FROM objects WHERE key LIKE ?1 ESCAPE '\\'",
            params![pattern],
        )?;
        Ok(n)
    }
}
