use crate::output::print_json;
use anyhow::Context;
use capnorm_core::config::Config;
use capnorm_core::lock::MaintenanceLock;
use capnorm_core::migrate::{migrate, MigrateOptions};
use capnorm_core::report::{MemorySink, WriterSink};
use capnorm_core::store::SqliteAgentStore;
use std::path::Path;

pub fn run(
    root: &Path,
    db: Option<&Path>,
    dry_run: bool,
    break_lock: bool,
    json: bool,
) -> anyhow::Result<()> {
    let config = Config::load_or_default(root).context("failed to load config")?;
    let db_path = match db {
        Some(p) => p.to_path_buf(),
        None => config.store_path(root),
    };

    if !json {
        println!("Connecting to {}...", db_path.display());
    }
    let mut store = SqliteAgentStore::open_table(&db_path, &config.store.table)
        .with_context(|| format!("failed to open agent store {}", db_path.display()))?;

    if break_lock && MaintenanceLock::break_stale(&db_path)? {
        tracing::warn!(db = %db_path.display(), "removed stale maintenance lock");
    }
    let _lock = MaintenanceLock::acquire(&db_path).context("failed to acquire maintenance lock")?;

    let options = MigrateOptions { dry_run };
    if json {
        let mut sink = MemorySink::default();
        let summary = migrate(&mut store, &mut sink, options).context("migration failed")?;
        let value = serde_json::json!({
            "db": db_path,
            "summary": summary,
            "report": sink.lines,
        });
        print_json(&value)?;
    } else {
        let mut sink = WriterSink::stdout();
        migrate(&mut store, &mut sink, options).context("migration failed")?;
    }
    Ok(())
}
