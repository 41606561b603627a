use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use track_catalog_server::catalog_import::{run_import, ImportOutcome, ImportSettings};
use track_catalog_server::catalog_store::SqliteCatalogStore;

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

/// Loads a CSV export into an empty catalog database and exits.
#[derive(Parser, Debug)]
struct CliArgs {
    /// Directory holding catalog.db, the database is created if missing.
    #[clap(value_parser = parse_path)]
    pub db_dir: PathBuf,

    /// CSV file to import.
    #[clap(value_parser = parse_path)]
    pub source: PathBuf,

    /// Single-byte field delimiter of the source.
    #[clap(long, default_value_t = ',')]
    pub delimiter: char,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let cli_args = CliArgs::parse();

    if !cli_args.delimiter.is_ascii() {
        bail!("Delimiter must be a single ASCII character");
    }
    if !cli_args.db_dir.is_dir() {
        bail!("Not a directory: {:?}", cli_args.db_dir);
    }

    let store = SqliteCatalogStore::new(cli_args.db_dir.join("catalog.db"), 1)?;
    let settings = ImportSettings {
        source_path: Some(cli_args.source),
        delimiter: cli_args.delimiter as u8,
        ..Default::default()
    };

    match run_import(&store, &settings)? {
        ImportOutcome::Imported(report) => {
            println!(
                "Imported {} tracks ({} rows skipped)",
                report.imported, report.skipped
            );
        }
        ImportOutcome::AlreadyPopulated => {
            println!("Catalog is not empty, nothing imported");
        }
        ImportOutcome::SourceUnavailable(reason) => {
            bail!("Import source unavailable: {}", reason);
        }
    }
    Ok(())
}
