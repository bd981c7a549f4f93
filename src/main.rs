//! LookFor — lazily-scanned filesystem browser with tri-state selection.
//!
//! Thin binary entry point. All logic lives in the `lookfor-core`
//! and `lookfor-browse` crates.

use anyhow::{Context, Result};
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use lookfor_browse::{export_selection_csv, render_rows, BrowseSession, TreeSnapshot};
use lookfor_core::model::size::format_count;
use lookfor_core::{CheckState, ModelConfig};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "lookfor", version, about = "Browse a directory tree and select entries")]
struct Cli {
    /// Directory (or file) to open.
    root: PathBuf,

    /// Expand directories down to this depth before printing.
    #[arg(long, default_value_t = 1)]
    depth: u16,

    /// Check an entry (and everything under it). Relative paths are resolved
    /// against ROOT. Repeatable; applied in command-line order with --uncheck.
    #[arg(long, value_name = "PATH")]
    check: Vec<PathBuf>,

    /// Uncheck an entry (and everything under it).
    #[arg(long, value_name = "PATH")]
    uncheck: Vec<PathBuf>,

    /// JSON configuration file.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Scan worker threads (0 = one per CPU).
    #[arg(long)]
    threads: Option<usize>,

    /// Skip dot-files.
    #[arg(long)]
    no_hidden: bool,

    /// Give up waiting for listings after this many seconds.
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Print the discovered tree as JSON instead of a table.
    #[arg(long)]
    json: bool,

    /// Write the selection to a CSV file.
    #[arg(long, value_name = "FILE")]
    export_csv: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    let config = load_config(&cli)?;
    let mut session = BrowseSession::new(config).context("failed to start scan workers")?;

    session.open(&cli.root);
    if !session.expand_to_depth(cli.depth, Duration::from_secs(cli.timeout)) {
        tracing::warn!(timeout_secs = cli.timeout, "listings still running, output is partial");
    }

    for (path, state) in selection_ops(&cli, &matches) {
        let path = resolve_under(&cli.root, &path);
        match session.set_checked(&path, state) {
            Ok(true) => {}
            Ok(false) => tracing::warn!(path = %path.display(), "not found in the listed tree"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "selection change rejected"),
        }
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if cli.json {
        match TreeSnapshot::capture(session.model()) {
            Some(snapshot) => snapshot.write_json(&mut out)?,
            None => write!(out, "null")?,
        }
        writeln!(out)?;
    } else {
        render_rows(&session, &mut out).context("failed to write listing")?;
    }

    let stats = session.model().scan_stats();
    tracing::info!(
        entries = %format_count(stats.entries_applied),
        listings = stats.jobs_finished,
        selected = session.model().checked_paths().len(),
        "done"
    );

    if let Some(csv_path) = &cli.export_csv {
        export_selection_csv(session.model(), csv_path)?;
        tracing::info!(path = %csv_path.display(), "selection exported");
    }

    Ok(())
}

/// Config file (if any), then command-line overrides, then validation.
fn load_config(cli: &Cli) -> Result<ModelConfig> {
    let mut config = match &cli.config {
        Some(path) => ModelConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ModelConfig::default(),
    };
    if let Some(threads) = cli.threads {
        config.worker_threads = threads;
    }
    if cli.no_hidden {
        config.include_hidden = false;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// `--check` and `--uncheck` values merged back into command-line order.
fn selection_ops(cli: &Cli, matches: &ArgMatches) -> Vec<(PathBuf, CheckState)> {
    let mut ops: Vec<(usize, PathBuf, CheckState)> = Vec::new();
    for (id, paths, state) in [
        ("check", &cli.check, CheckState::Checked),
        ("uncheck", &cli.uncheck, CheckState::Unchecked),
    ] {
        if let Some(indices) = matches.indices_of(id) {
            ops.extend(
                indices
                    .zip(paths)
                    .map(|(position, path)| (position, path.clone(), state)),
            );
        }
    }
    ops.sort_by_key(|(position, ..)| *position);
    ops.into_iter().map(|(_, path, state)| (path, state)).collect()
}

fn resolve_under(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
