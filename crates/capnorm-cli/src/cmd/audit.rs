use crate::output::print_json;
use anyhow::Context;
use capnorm_core::audit::{audit_workspace, AuditStatus};
use capnorm_core::config::Config;
use std::path::Path;

/// Exit status when at least one cluster is not mounted. Fatal errors exit 1.
pub const AUDIT_WARN_EXIT: i32 = 2;

#[derive(Debug, thiserror::Error)]
#[error("{0} agent cluster path(s) are not isolated")]
pub struct AuditWarnings(pub usize);

pub fn run(root: &Path, base: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let config = Config::load_or_default(root).context("failed to load config")?;
    let base = match base {
        Some(p) => p.to_path_buf(),
        None => config.audit_base(root),
    };

    let report = audit_workspace(&base, &config.audit.clusters);

    if json {
        print_json(&serde_json::json!({
            "passed": report.all_passed(),
            "report": report,
        }))?;
    } else {
        println!("[*] Initializing Workspace Security Audit: {}", base.display());
        println!();
        for line in report.render_lines() {
            println!("{line}");
        }
    }

    let warned = report
        .entries
        .iter()
        .filter(|e| e.status != AuditStatus::Pass)
        .count();
    if warned > 0 {
        return Err(AuditWarnings(warned).into());
    }
    Ok(())
}
