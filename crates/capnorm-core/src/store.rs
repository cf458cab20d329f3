//! Persistent agent store.
//!
//! The migration driver only needs four things from a store: read every row,
//! overwrite the two label columns of one row, and group those writes into a
//! single commit. [`AgentStore`] is that seam; [`SqliteAgentStore`] is the
//! SQLite implementation over the `agents` table.

use crate::error::{CapnormError, Result};
use crate::paths::validate_table_name;
use rusqlite::types::Value;
use rusqlite::{params, Connection, OpenFlags};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_TABLE: &str = "agents";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// AgentRow
// ---------------------------------------------------------------------------

/// One agent record as stored. `skills_raw` / `workflows_raw` are the
/// serialized label lists exactly as found in the columns.
///
/// `id` is `None` when the column holds NULL or a non-text value. Such a row
/// cannot be addressed by [`AgentStore::update`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentRow {
    pub id: Option<String>,
    pub name: String,
    pub skills_raw: Option<String>,
    pub workflows_raw: Option<String>,
}

impl AgentRow {
    /// The id for report lines; `NULL` when the row has no usable id.
    pub fn display_id(&self) -> &str {
        self.id.as_deref().unwrap_or("NULL")
    }
}

// ---------------------------------------------------------------------------
// AgentStore
// ---------------------------------------------------------------------------

pub trait AgentStore {
    /// Open the batch that every following `update` belongs to.
    fn begin(&mut self) -> Result<()>;

    /// All rows, in store order.
    fn read_all(&mut self) -> Result<Vec<AgentRow>>;

    /// Overwrite the label columns of the row with `id`.
    fn update(&mut self, id: &str, skills_raw: &str, workflows_raw: &str) -> Result<()>;

    /// Make every update since `begin` durable.
    fn commit(&mut self) -> Result<()>;

    /// Discard every update since `begin`. A no-op without an open batch.
    fn rollback(&mut self) -> Result<()>;
}

// ---------------------------------------------------------------------------
// SqliteAgentStore
// ---------------------------------------------------------------------------

pub struct SqliteAgentStore {
    conn: Connection,
    path: PathBuf,
    table: String,
    in_batch: bool,
}

impl SqliteAgentStore {
    /// Open an existing database and check that the `agents` table carries the
    /// columns the migration touches.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_table(path, DEFAULT_TABLE)
    }

    pub fn open_table(path: &Path, table: &str) -> Result<Self> {
        validate_table_name(table)?;
        // No SQLITE_OPEN_CREATE: a missing database is a connectivity failure,
        // not an empty store.
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| CapnormError::StoreUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        let store = Self {
            conn,
            path: path.to_path_buf(),
            table: table.to_string(),
            in_batch: false,
        };
        store.check_schema()?;
        Ok(store)
    }

    /// Create the database file (if missing) and the agents table.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            crate::io::ensure_dir(parent)?;
        }
        let conn = Connection::open(path).map_err(|source| CapnormError::StoreUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let store = Self {
            conn,
            path: path.to_path_buf(),
            table: DEFAULT_TABLE.to_string(),
            in_batch: false,
        };
        store.init_schema()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT '',
                department TEXT NOT NULL DEFAULT '',
                skills TEXT,
                workflows TEXT
            )",
            table = self.table
        ))?;
        Ok(())
    }

    fn check_schema(&self) -> Result<()> {
        self.conn
            .prepare(&format!(
                "SELECT id, name, skills, workflows FROM {} LIMIT 0",
                self.table
            ))
            .map(|_| ())
            .map_err(|e| CapnormError::StoreSchema(format!("{}: {e}", self.path.display())))
    }

    /// Insert a row, or replace name and label columns of an existing one.
    pub fn upsert_agent(&self, row: &AgentRow) -> Result<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO {} (id, name, skills, workflows) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 skills = excluded.skills,
                 workflows = excluded.workflows",
                self.table
            ),
            params![row.id, row.name, row.skills_raw, row.workflows_raw],
        )?;
        Ok(())
    }

    /// Read every row without opening a batch.
    pub fn list_agents(&self) -> Result<Vec<AgentRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, name, skills, workflows FROM {}",
            self.table
        ))?;
        let rows = stmt.query_map([], |r| {
            Ok(AgentRow {
                id: value_to_key(r.get(0)?),
                name: value_to_text(r.get(1)?).unwrap_or_default(),
                skills_raw: value_to_text(r.get(2)?),
                workflows_raw: value_to_text(r.get(3)?),
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

/// Render any SQLite value as text. Non-text label columns then fail JSON
/// parsing and are treated as malformed rather than aborting the read.
fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(f) => Some(f.to_string()),
        Value::Text(s) => Some(s),
        Value::Blob(b) => Some(String::from_utf8_lossy(&b).into_owned()),
    }
}

/// Only text ids round-trip through `update`'s `WHERE id = ?`.
fn value_to_key(value: Value) -> Option<String> {
    match value {
        Value::Text(s) => Some(s),
        _ => None,
    }
}

impl AgentStore for SqliteAgentStore {
    fn begin(&mut self) -> Result<()> {
        if self.in_batch {
            return Ok(());
        }
        // IMMEDIATE takes the write lock up front so a concurrent writer fails
        // fast instead of interleaving with the batch.
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        self.in_batch = true;
        Ok(())
    }

    fn read_all(&mut self) -> Result<Vec<AgentRow>> {
        self.list_agents()
    }

    fn update(&mut self, id: &str, skills_raw: &str, workflows_raw: &str) -> Result<()> {
        if !self.in_batch {
            return Err(CapnormError::NoBatch("update"));
        }
        let changed = self.conn.execute(
            &format!(
                "UPDATE {} SET skills = ?1, workflows = ?2 WHERE id = ?3",
                self.table
            ),
            params![skills_raw, workflows_raw, id],
        )?;
        if changed == 0 {
            return Err(CapnormError::RecordNotFound(id.to_string()));
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        if !self.in_batch {
            return Err(CapnormError::NoBatch("commit"));
        }
        self.conn.execute_batch("COMMIT")?;
        self.in_batch = false;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        if !self.in_batch {
            return Ok(());
        }
        self.in_batch = false;
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
