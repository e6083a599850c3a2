//! `sumika` — building-registry CLI.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! registry, and runs one pipeline operation per invocation:
//!
//! ```text
//! sumika ingest weekly.csv --source weekly
//! sumika seed curated.csv
//! sumika merge-overrides curated.csv --out out/
//! sumika renormalize
//! sumika stats
//! ```

use std::{fs::File, path::PathBuf};

use anyhow::Context as _;
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use sumika_core::registry::BuildingRegistry;
use sumika_import::{parse_master, parse_seed, write_aliases, write_overrides};
use sumika_pipeline::{ReviewSink, ingest_master, ingest_seed, merge_overrides, renormalize};
use sumika_store_sqlite::SqliteRegistry;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI ─────────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about = "Sumika building registry")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Ingest a master-import CSV (weekly scrape output).
  Ingest {
    file: PathBuf,
    /// Source label recorded on evidence; defaults to the configured one.
    #[arg(long)]
    source: Option<String>,
  },
  /// Apply a UI-curated seed CSV.
  Seed { file: PathBuf },
  /// Resolve curator merges and write overrides.csv / alias.csv.
  MergeOverrides {
    file: PathBuf,
    /// Output directory for the two artifact files.
    #[arg(long, default_value = "out")]
    out: PathBuf,
  },
  /// Recompute normalized matching forms after a rules change.
  Renormalize,
  /// Print registry counters.
  Stats,
}

// ─── Settings ────────────────────────────────────────────────────────────────

/// Shape of `config.toml`; every field has a default, and `SUMIKA_*`
/// environment variables override the file.
#[derive(Debug, Clone, Deserialize)]
struct Settings {
  #[serde(default = "default_db_path")]
  db_path:        PathBuf,
  #[serde(default = "default_review_dir")]
  review_dir:     PathBuf,
  #[serde(default = "default_source")]
  default_source: String,
}

fn default_db_path() -> PathBuf { PathBuf::from("sumika.db") }
fn default_review_dir() -> PathBuf { PathBuf::from("review") }
fn default_source() -> String { "weekly".to_string() }

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config.clone()).required(false))
    .add_source(config::Environment::with_prefix("SUMIKA"))
    .build()
    .context("failed to read configuration")?;
  let settings: Settings = settings
    .try_deserialize()
    .context("failed to deserialise settings")?;

  let registry = SqliteRegistry::open(&settings.db_path)
    .await
    .with_context(|| format!("failed to open registry at {:?}", settings.db_path))?;

  match cli.command {
    Command::Ingest { file, source } => {
      let source = source.unwrap_or_else(|| settings.default_source.clone());
      let rows = parse_master(open(&file)?)
        .with_context(|| format!("parsing master import {}", file.display()))?;

      let mut reviews = ReviewSink::new();
      let report = ingest_master(&registry, &rows, &source, &mut reviews).await?;

      if !reviews.is_empty() {
        std::fs::create_dir_all(&settings.review_dir)?;
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        for path in reviews.write_to_dir(&settings.review_dir, &timestamp)? {
          tracing::info!(path = %path.display(), "review file written");
        }
      }

      println!(
        "buildings: {} total, {} new; listings: {}; unresolved: {}",
        report.buildings_total,
        report.newly_added,
        report.attached_listings,
        report.unresolved,
      );
    }

    Command::Seed { file } => {
      let rows = parse_seed(open(&file)?)
        .with_context(|| format!("parsing seed file {}", file.display()))?;
      let report = ingest_seed(&registry, &rows).await?;
      println!(
        "buildings inserted: {}; evidence attached: {}",
        report.buildings_inserted, report.evidence_attached,
      );
    }

    Command::MergeOverrides { file, out } => {
      let rows = parse_seed(open(&file)?)
        .with_context(|| format!("parsing seed export {}", file.display()))?;
      let artifacts = merge_overrides(&rows)?;

      std::fs::create_dir_all(&out)?;
      let overrides_path = out.join("overrides.csv");
      let alias_path = out.join("alias.csv");
      write_overrides(File::create(&overrides_path)?, &artifacts.overrides)?;
      write_aliases(File::create(&alias_path)?, &artifacts.aliases)?;
      println!(
        "{} overrides -> {}; {} aliases -> {}",
        artifacts.overrides.len(),
        overrides_path.display(),
        artifacts.aliases.len(),
        alias_path.display(),
      );
    }

    Command::Renormalize => {
      let report = renormalize(&registry).await?;
      println!("scanned: {}; rewritten: {}", report.scanned, report.rewritten);
    }

    Command::Stats => {
      println!(
        "buildings: {}; evidence links: {}; listings: {}",
        registry.building_count().await?,
        registry.evidence_count().await?,
        registry.listing_count().await?,
      );
    }
  }

  Ok(())
}

fn open(path: &PathBuf) -> anyhow::Result<File> {
  File::open(path).with_context(|| format!("opening {}", path.display()))
}
