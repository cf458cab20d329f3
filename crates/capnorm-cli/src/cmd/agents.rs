use crate::output::{print_json, print_table};
use anyhow::Context;
use capnorm_core::config::Config;
use capnorm_core::store::{AgentRow, SqliteAgentStore};
use capnorm_core::transform::{transform_row, LabelFields};
use clap::Subcommand;
use serde::Serialize;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum AgentsSubcommand {
    /// List agents with their label state (canonical, pending, malformed)
    List {
        /// Agent database (default: store.path from config)
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: AgentsSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        AgentsSubcommand::List { db } => list(root, db.as_deref(), json),
    }
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum LabelState {
    Canonical,
    Pending,
    Malformed,
}

impl LabelState {
    fn as_str(&self) -> &'static str {
        match self {
            LabelState::Canonical => "canonical",
            LabelState::Pending => "pending",
            LabelState::Malformed => "malformed",
        }
    }
}

#[derive(Serialize)]
struct AgentView {
    id: Option<String>,
    name: String,
    state: LabelState,
    #[serde(flatten)]
    labels: Option<LabelFields>,
}

fn classify(row: AgentRow) -> AgentView {
    let (state, labels) = match transform_row(&row) {
        Ok(change) if change.is_changed() => (LabelState::Pending, Some(change.before)),
        Ok(change) => (LabelState::Canonical, Some(change.before)),
        Err(_) => (LabelState::Malformed, None),
    };
    AgentView {
        id: row.id,
        name: row.name,
        state,
        labels,
    }
}

fn list(root: &Path, db: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let config = Config::load_or_default(root).context("failed to load config")?;
    let db_path = match db {
        Some(p) => p.to_path_buf(),
        None => config.store_path(root),
    };
    let store = SqliteAgentStore::open_table(&db_path, &config.store.table)
        .with_context(|| format!("failed to open agent store {}", db_path.display()))?;

    let views: Vec<AgentView> = store.list_agents()?.into_iter().map(classify).collect();

    if json {
        return print_json(&views);
    }
    if views.is_empty() {
        println!("No agents in {}.", db_path.display());
        return Ok(());
    }

    let rows: Vec<Vec<String>> = views
        .iter()
        .map(|v| {
            let (skills, workflows) = match &v.labels {
                Some(l) => (l.skills.join(", "), l.workflows.join(", ")),
                None => ("-".to_string(), "-".to_string()),
            };
            vec![
                v.id.as_deref().unwrap_or("NULL").to_string(),
                v.name.clone(),
                v.state.as_str().to_string(),
                skills,
                workflows,
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "STATE", "SKILLS", "WORKFLOWS"], &rows);
    Ok(())
}
