mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{agents::AgentsSubcommand, config::ConfigSubcommand, seed::SeedSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "capnorm",
    about = "Normalize capability labels into canonical identifiers across agent stores and seed data",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .capnorm/)
    #[arg(long, global = true, env = "CAPNORM_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default .capnorm/config.yaml
    Init,

    /// Print the canonical identifier for each label
    Normalize {
        /// Labels to normalize (e.g. "Deploy to Prod")
        #[arg(required = true)]
        labels: Vec<String>,
    },

    /// Normalize skills and workflows of every agent in the store
    Migrate {
        /// Agent database (default: store.path from config)
        #[arg(long)]
        db: Option<PathBuf>,

        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,

        /// Remove a maintenance lock left behind by a crashed run first
        #[arg(long)]
        break_lock: bool,
    },

    /// Inspect agent records
    Agents {
        #[command(subcommand)]
        subcommand: AgentsSubcommand,
    },

    /// Rewrite label literals in the seed dataset
    Seed {
        #[command(subcommand)]
        subcommand: SeedSubcommand,
    },

    /// Check that every agent cluster workspace is mounted
    Audit {
        /// Workspace base directory (default: audit.base_path from config)
        #[arg(long)]
        base: Option<PathBuf>,
    },

    /// Show or validate the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Migrate { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root_path = cli.root.as_deref();
    let root = root::resolve_root(root_path);

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Normalize { labels } => cmd::normalize::run(&labels, cli.json),
        Commands::Migrate {
            db,
            dry_run,
            break_lock,
        } => cmd::migrate::run(&root, db.as_deref(), dry_run, break_lock, cli.json),
        Commands::Agents { subcommand } => cmd::agents::run(&root, subcommand, cli.json),
        Commands::Seed { subcommand } => cmd::seed::run(&root, subcommand, cli.json),
        Commands::Audit { base } => cmd::audit::run(&root, base.as_deref(), cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        if let Some(warned) = e.downcast_ref::<cmd::audit::AuditWarnings>() {
            eprintln!("[!] SECURITY ALERT: {warned}");
            std::process::exit(cmd::audit::AUDIT_WARN_EXIT);
        }
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
