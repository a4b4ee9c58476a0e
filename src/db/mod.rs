//! SQLite storage layer for formsmith
//!
//! A single key-value table standing in for the browser's durable
//! storage. Values are whole JSON documents.

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::config::FormsmithPaths;
use crate::error::FormResult;
use crate::store::KeyValueStore;

/// Database wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open an existing database
    pub fn open(paths: &FormsmithPaths) -> Result<Self> {
        Self::open_at(&paths.db_file)
    }

    /// Initialize a new database with schema
    pub fn init(paths: &FormsmithPaths) -> Result<Self> {
        Self::open_at(&paths.db_file).context("Failed to create formsmith database")
    }

    /// Open (creating if needed) a database file at an explicit path
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open formsmith database at {}", path.display()))?;
        let db = Self { conn };
        db.create_tables()?;
        Ok(db)
    }

    fn create_tables(&self) -> Result<()> {
        self.conn
            .execute(
                r#"
                CREATE TABLE IF NOT EXISTS storage (
                    key         TEXT PRIMARY KEY,
                    value       TEXT NOT NULL,
                    updated_at  INTEGER NOT NULL
                )
                "#,
                [],
            )
            .context("Failed to create storage table")?;
        Ok(())
    }

    /// When a key was last written (unix seconds)
    pub fn updated_at(&self, key: &str) -> FormResult<Option<i64>> {
        let ts = self
            .conn
            .query_row(
                "SELECT updated_at FROM storage WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(ts)
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> FormResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM storage WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> FormResult<()> {
        let now = chrono::Utc::now().timestamp();
        self.conn.execute(
            r#"
            INSERT INTO storage (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, value, now],
        )?;
        tracing::debug!(key, bytes = value.len(), "storage write");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_overwrites_and_survives_reopen() -> Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("formsmith.db");

        {
            let mut db = Database::open_at(&path)?;
            assert_eq!(db.get("submissions")?, None);
            db.set("submissions", "[]")?;
            db.set("submissions", "[{\"a\":\"1\"}]")?;
            assert!(db.updated_at("submissions")?.is_some());
        }

        let db = Database::open_at(&path)?;
        assert_eq!(db.get("submissions")?.as_deref(), Some("[{\"a\":\"1\"}]"));
        assert_eq!(db.updated_at("other")?, None);
        Ok(())
    }
}
