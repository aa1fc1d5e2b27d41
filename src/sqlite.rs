// SQLite-backed slot

use crate::slot::{Slot, validate_key};
use crate::store::now_ms;
use eyre::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use std::fs;
use std::path::Path;
use tracing::debug;

const DB_FILE: &str = "todostore.db";

/// Slot stored as rows of a single `slots` table
pub struct SqliteSlot {
    db: Connection,
}

impl SqliteSlot {
    /// Open or create `todostore.db` inside the given directory
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base_path = path.as_ref();
        fs::create_dir_all(base_path).context("Failed to create store directory")?;

        let db_path = base_path.join(DB_FILE);
        let db = Connection::open(&db_path).context("Failed to open SQLite database")?;
        debug!(path = ?db_path, "Opened SQLite slot");

        let slot = Self { db };
        slot.create_schema()?;
        Ok(slot)
    }

    /// Open a database that lives only as long as this value
    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory().context("Failed to open in-memory SQLite database")?;
        let slot = Self { db };
        slot.create_schema()?;
        Ok(slot)
    }

    /// Get a reference to the SQLite database connection
    pub fn db(&self) -> &Connection {
        &self.db
    }

    fn create_schema(&self) -> Result<()> {
        self.db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS slots (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;
        Ok(())
    }
}

impl Slot for SqliteSlot {
    fn load(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        let value = self
            .db
            .query_row("SELECT value FROM slots WHERE key = ?1", [key], |row| row.get(0))
            .optional()
            .context("Failed to read slot")?;
        Ok(value)
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        self.db
            .execute(
                "INSERT OR REPLACE INTO slots (key, value, updated_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![key, value, now_ms()],
            )
            .context("Failed to write slot")?;
        Ok(())
    }
}
