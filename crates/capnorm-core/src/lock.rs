//! Maintenance lock for the single-writer migration window.
//!
//! The lock is a file next to the database created with exclusive-create
//! semantics. It only excludes other `capnorm` runs; foreign writers are
//! excluded by the store's own write transaction.

use crate::error::{CapnormError, Result};
use crate::paths;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    pub pid: u32,
    pub acquired_at: DateTime<Utc>,
}

impl std::fmt::Display for LockInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pid {} since {}", self.pid, self.acquired_at.to_rfc3339())
    }
}

/// Held for the duration of a migration. Dropping it removes the lock file.
#[derive(Debug)]
pub struct MaintenanceLock {
    path: PathBuf,
}

impl MaintenanceLock {
    pub fn acquire(db_path: &Path) -> Result<Self> {
        let path = paths::lock_path(db_path);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let holder = Self::holder(db_path)
                    .map(|info| info.to_string())
                    .unwrap_or_else(|| "unknown holder".to_string());
                return Err(CapnormError::MaintenanceLocked { path, holder });
            }
            Err(e) => return Err(e.into()),
        };

        let lock = Self { path };
        let info = LockInfo {
            pid: std::process::id(),
            acquired_at: Utc::now(),
        };
        // On failure `lock` drops here and removes the half-written file.
        file.write_all(serde_yaml::to_string(&info)?.as_bytes())?;
        tracing::debug!(path = %lock.path.display(), pid = info.pid, "maintenance lock acquired");
        Ok(lock)
    }

    /// Who holds the lock for `db_path`, if anyone.
    pub fn holder(db_path: &Path) -> Option<LockInfo> {
        let data = std::fs::read_to_string(paths::lock_path(db_path)).ok()?;
        serde_yaml::from_str(&data).ok()
    }

    /// Remove a lock left behind by a crashed run. Returns true if a lock
    /// file was removed.
    pub fn break_stale(db_path: &Path) -> Result<bool> {
        match std::fs::remove_file(paths::lock_path(db_path)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for MaintenanceLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to remove maintenance lock");
        }
    }
}
