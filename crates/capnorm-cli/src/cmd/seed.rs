use crate::output::{print_json, print_table};
use anyhow::Context;
use capnorm_core::config::Config;
use capnorm_core::seed::{rewrite_seed_file, SeedFormat};
use clap::Subcommand;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum SeedSubcommand {
    /// Replace quoted display labels with their identifiers
    Rewrite {
        /// Seed file (default: seed.path from config)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Report replacements without writing the file
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the label → identifier vocabulary
    Vocab,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: SeedSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        SeedSubcommand::Rewrite { file, dry_run } => rewrite(root, file.as_deref(), dry_run, json),
        SeedSubcommand::Vocab => vocab(root, json),
    }
}

// ---------------------------------------------------------------------------
// rewrite
// ---------------------------------------------------------------------------

fn rewrite(root: &Path, file: Option<&Path>, dry_run: bool, json: bool) -> anyhow::Result<()> {
    let config = Config::load_or_default(root).context("failed to load config")?;
    let vocab = config.seed.vocabulary().context("invalid seed vocabulary")?;
    let path = match file {
        Some(p) => p.to_path_buf(),
        None => config.seed_path(root),
    };

    let outcome = rewrite_seed_file(&path, &vocab, dry_run)
        .with_context(|| format!("failed to rewrite {}", path.display()))?;

    if json {
        let value = serde_json::json!({
            "path": path,
            "format": SeedFormat::detect(&path),
            "dry_run": dry_run,
            "replaced": outcome.total(),
            "replacements": outcome.replacements,
        });
        return print_json(&value);
    }

    if !outcome.is_changed() {
        println!("{} is already normalized.", path.display());
        return Ok(());
    }
    for r in &outcome.replacements {
        println!("  '{}' -> '{}' (x{})", r.label, r.identifier, r.count);
    }
    if dry_run {
        println!(
            "Dry run: {} literals would be rewritten in {}.",
            outcome.total(),
            path.display()
        );
    } else {
        println!(
            "{} normalized: rewrote {} literals.",
            path.display(),
            outcome.total()
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// vocab
// ---------------------------------------------------------------------------

fn vocab(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load_or_default(root).context("failed to load config")?;
    let vocab = config.seed.vocabulary().context("invalid seed vocabulary")?;

    if json {
        let overlaps: Vec<_> = vocab
            .overlaps()
            .into_iter()
            .map(|(inner, outer)| serde_json::json!({ "inner": inner, "outer": outer }))
            .collect();
        let value = serde_json::json!({
            "entries": vocab.entries(),
            "overlaps": overlaps,
        });
        return print_json(&value);
    }

    let rows: Vec<Vec<String>> = vocab
        .entries()
        .iter()
        .map(|e| vec![e.label.clone(), e.identifier.clone()])
        .collect();
    print_table(&["LABEL", "IDENTIFIER"], &rows);
    for (inner, outer) in vocab.overlaps() {
        println!("[warning] '{inner}' is a substring of '{outer}'");
    }
    Ok(())
}
