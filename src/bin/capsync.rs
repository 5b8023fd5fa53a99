//! Verify a declared service configuration against a live deployment.
//!
//! Usage:
//!   capsync
//!   capsync --config etc/other.toml
//!   capsync -u -o corrected.toml
//!   capsync -u -r
//!
//! Every discrepancy prints as one line on stdout. Discrepancies are not
//! failures: the exit code is non-zero only when the catalog cannot be
//! fetched or the output target cannot be prepared.

use anyhow::{Context, Result, anyhow, bail};
use capsync::{ConfigStore, HttpProber, RunContext, RunFlags, run_verification};
use clap::Parser;
use std::env;
use std::path::PathBuf;

const DEFAULT_CONFIG: &str = "etc/capsync.toml";
const CONFIG_ENV: &str = "CAPSYNC_CONFIG";

#[derive(Parser, Debug)]
#[command(name = "capsync")]
#[command(about = "Probe live services and reconcile the declared configuration")]
struct Cli {
    /// Rewrite config options whose declared state contradicts discovery.
    /// Whatever is declared is assumed to be the wrong side of a mismatch;
    /// for endpoint checks that means the availability flag is corrected,
    /// not the catalog type.
    #[arg(short, long)]
    update: bool,
    /// Destination for the rewritten configuration; must differ from the
    /// source file. Without it, --update prints the result to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Replace wildcard `all` declarations with the full discovered list.
    #[arg(short = 'r', long = "replace-ext")]
    replace_ext: bool,
    /// Declared-configuration source (or set CAPSYNC_CONFIG).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    if cli.output.is_some() && !cli.update {
        bail!("--output only makes sense with --update");
    }

    let config_path = resolve_config_path(cli.config);
    let store = ConfigStore::load(&config_path)
        .with_context(|| format!("loading declared configuration {}", config_path.display()))?;

    // The rewrite target is validated before anything is probed so a late
    // write failure cannot discard the report.
    let target = if cli.update {
        Some(store.open_target(cli.output.as_deref())?)
    } else {
        None
    };

    let catalog_uri = store
        .declared("identity", "uri")
        .ok_or_else(|| anyhow!("declared configuration is missing [identity] uri"))?;
    let prober =
        HttpProber::connect(&catalog_uri).context("fetching the live service catalog")?;

    println!("verifying declared configuration against {catalog_uri}");
    let report = run_verification(RunContext {
        store: &store,
        catalog: &prober,
        probe: &prober,
        flags: RunFlags {
            update: cli.update,
            replace_wildcard: cli.replace_ext,
        },
        target,
    })?;

    if report.discrepancies.is_empty() && report.skipped.is_empty() {
        println!("declared configuration matches the deployment");
    }
    Ok(())
}

fn resolve_config_path(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG))
}
