use crate::error::{CapnormError, Result};
use regex::Regex;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const CAPNORM_DIR: &str = ".capnorm";
pub const CONFIG_FILE: &str = ".capnorm/config.yaml";

pub const DEFAULT_STORE_PATH: &str = "tadpole.db";
pub const DEFAULT_SEED_PATH: &str = "src/data/mockAgents.ts";
pub const DEFAULT_AUDIT_BASE: &str = "workspaces";

pub const LOCK_SUFFIX: &str = ".capnorm.lock";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn capnorm_dir(root: &Path) -> PathBuf {
    root.join(CAPNORM_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Resolve a configured path against the project root. Absolute paths win.
pub fn resolve(root: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        root.join(configured)
    }
}

/// Maintenance lock file that sits next to the database: `tadpole.db` →
/// `tadpole.db.capnorm.lock`.
pub fn lock_path(db_path: &Path) -> PathBuf {
    let mut name: OsString = db_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("store"));
    name.push(LOCK_SUFFIX);
    db_path.with_file_name(name)
}

// ---------------------------------------------------------------------------
// Table name validation
// ---------------------------------------------------------------------------

static TABLE_RE: OnceLock<Regex> = OnceLock::new();

fn table_re() -> &'static Regex {
    TABLE_RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap())
}

/// Table names are spliced into SQL text, so only plain identifiers pass.
pub fn validate_table_name(name: &str) -> Result<()> {
    if name.len() > 64 || !table_re().is_match(name) {
        return Err(CapnormError::InvalidTableName(name.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
