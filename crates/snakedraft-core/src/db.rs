// SQLite persistence for draft snapshots.

use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use tracing::debug;

use crate::snapshot::{DraftSnapshot, SnapshotStore, SNAPSHOT_KEY};

/// SQLite-backed key-value store for draft state.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure the schema
    /// exists. Pass `":memory:"` for an ephemeral in-memory database (useful
    /// for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS draft_state (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// A poisoned lock still guards a usable connection; SQLite rolls back
    /// any statement the panicking thread left open.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Persist a JSON value under `key`, replacing any previous value.
    pub fn save_state(&self, key: &str, value: &Value) -> Result<()> {
        let conn = self.conn();
        let json_str = serde_json::to_string(value).context("failed to serialize state value")?;
        conn.execute(
            "INSERT OR REPLACE INTO draft_state (key, value, updated_at)
             VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))",
            params![key, json_str],
        )
        .context("failed to save state")?;
        Ok(())
    }

    /// Load the text stored under `key`, if any, without parsing it.
    pub fn load_raw_state(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT value FROM draft_state WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .context("failed to query draft state")
    }

    /// Load the JSON value stored under `key`, if any.
    pub fn load_state(&self, key: &str) -> Result<Option<Value>> {
        match self.load_raw_state(key)? {
            Some(s) => {
                let value = serde_json::from_str(&s).context("failed to deserialize state value")?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// When `key` was last written, as an ISO-8601 UTC string.
    pub fn updated_at(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT updated_at FROM draft_state WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .context("failed to query state timestamp")
    }

    /// Delete all stored draft state.
    pub fn clear_draft(&self) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin transaction")?;
        tx.execute("DELETE FROM draft_state", [])
            .context("failed to delete draft state")?;
        tx.commit().context("failed to commit clear_draft")?;
        Ok(())
    }

    /// Whether a snapshot is waiting to be restored.
    pub fn has_draft_in_progress(&self) -> Result<bool> {
        Ok(self.load_raw_state(SNAPSHOT_KEY)?.is_some())
    }
}

impl SnapshotStore for Database {
    fn save(&self, snapshot: &DraftSnapshot) -> Result<()> {
        let value = serde_json::to_value(snapshot).context("failed to serialize snapshot")?;
        self.save_state(SNAPSHOT_KEY, &value)?;
        debug!("saved snapshot at pick {}", snapshot.current_pick);
        Ok(())
    }

    fn load(&self) -> Result<Option<String>> {
        self.load_raw_state(SNAPSHOT_KEY)
    }

    fn clear(&self) -> Result<()> {
        self.clear_draft()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
