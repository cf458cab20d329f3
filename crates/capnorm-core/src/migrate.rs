//! Migration driver: normalize the label columns of every agent record.
//!
//! All updates share one batch. Any error before the batch is committed rolls
//! it back before propagating, so the store ends up either fully migrated or
//! exactly as it was. Once the commit succeeds the run counts as done: a
//! failure to write the closing report line is logged, not returned. Rows
//! with malformed label columns or without a text id are skipped and
//! reported; they never abort the run.

use crate::error::{CapnormError, Result};
use crate::report::ReportSink;
use crate::store::{AgentRow, AgentStore};
use crate::transform::{record_key, transform_row, MalformedField, RecordChange};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default)]
pub struct MigrateOptions {
    /// Compute and report changes, then roll the batch back.
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    pub id: Option<String>,
    pub name: String,
    pub error: MalformedField,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MigrationSummary {
    pub scanned: usize,
    pub changed: usize,
    pub skipped: Vec<SkippedRecord>,
    pub dry_run: bool,
}

pub fn migrate<S>(
    store: &mut S,
    sink: &mut dyn ReportSink,
    options: MigrateOptions,
) -> Result<MigrationSummary>
where
    S: AgentStore + ?Sized,
{
    store.begin()?;
    let summary = match run_batch(store, sink, options) {
        Ok(summary) => summary,
        Err(e) => return Err(abort(store, e)),
    };

    let finished = if options.dry_run {
        store.rollback()
    } else {
        store.commit()
    };
    if let Err(e) = finished {
        return Err(abort(store, e));
    }

    let closing = if options.dry_run {
        format!("Dry run: {} agents would be updated.", summary.changed)
    } else {
        format!("Done. Updated {} agents.", summary.changed)
    };
    if let Err(e) = sink.line(&closing) {
        tracing::warn!(error = %e, "batch finished but the summary line could not be written");
    }

    tracing::info!(
        scanned = summary.scanned,
        changed = summary.changed,
        skipped = summary.skipped.len(),
        dry_run = summary.dry_run,
        "migration finished"
    );
    Ok(summary)
}

fn abort<S>(store: &mut S, error: CapnormError) -> CapnormError
where
    S: AgentStore + ?Sized,
{
    if let Err(rollback_err) = store.rollback() {
        tracing::error!(error = %rollback_err, "rollback after failed migration also failed");
    }
    error
}

/// Transform and (unless dry-run) update every row. Leaves the batch open.
fn run_batch<S>(
    store: &mut S,
    sink: &mut dyn ReportSink,
    options: MigrateOptions,
) -> Result<MigrationSummary>
where
    S: AgentStore + ?Sized,
{
    let rows = store.read_all()?;
    let mut summary = MigrationSummary {
        scanned: rows.len(),
        dry_run: options.dry_run,
        ..Default::default()
    };

    for row in rows {
        let parsed = record_key(&row).and_then(|id| Ok((id, transform_row(&row)?)));
        let (id, change) = match parsed {
            Ok(parsed) => parsed,
            Err(error) => {
                tracing::warn!(id = %row.display_id(), name = %row.name, %error, "skipping malformed agent");
                sink.line(&format!(
                    "Skipped Agent '{}' (ID: {}): {error}",
                    row.name,
                    row.display_id()
                ))?;
                summary.skipped.push(SkippedRecord {
                    id: row.id.clone(),
                    name: row.name.clone(),
                    error,
                });
                continue;
            }
        };

        if !change.is_changed() {
            tracing::debug!(id, "labels already canonical");
            continue;
        }

        if !options.dry_run {
            let (skills_raw, workflows_raw) = change.after.to_raw();
            store.update(id, &skills_raw, &workflows_raw)?;
        }
        report_change(sink, &row, &change)?;
        summary.changed += 1;
    }
    Ok(summary)
}

fn report_change(sink: &mut dyn ReportSink, row: &AgentRow, change: &RecordChange) -> Result<()> {
    sink.line(&format!(
        "Updating Agent '{}' (ID: {})",
        row.name,
        row.display_id()
    ))?;
    sink.line(&format!(
        "  Skills: {:?} -> {:?}",
        change.before.skills, change.after.skills
    ))?;
    sink.line(&format!(
        "  Workflows: {:?} -> {:?}",
        change.before.workflows, change.after.workflows
    ))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
