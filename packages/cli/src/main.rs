#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for STOPS PRN table extraction.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};
use stops_prn_cli_utils::{IndicatifProgress, init_logger};
use stops_prn_extract::output::write_table_to;
use stops_prn_extract::{ExtractionConfig, run_extraction};
use stops_prn_report::registry::LayoutSource;
use stops_prn_report::{Catalog, ExtractionRegistry, extract_table, read_document};

#[derive(Parser)]
#[command(name = "stops_prn", about = "Extract tables from STOPS PRN reports")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract every configured table from every configured report
    Run {
        /// Path to the TOML run configuration
        #[arg(long)]
        config: PathBuf,
        /// Comma-separated list of table IDs to extract (subset of the configured tables)
        #[arg(long)]
        tables: Option<String>,
        /// Comma-separated list of aliases to process (subset of the configured files)
        #[arg(long)]
        aliases: Option<String>,
        /// Write a `.meta.json` sidecar next to every CSV
        #[arg(long)]
        metadata: bool,
    },
    /// Extract a single table from a single report as CSV
    Table {
        /// Path to the `.PRN` report
        file: PathBuf,
        /// Table identifier (e.g., "10.01")
        table_id: String,
        /// Catalog JSON to use instead of the embedded catalog
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Write the CSV here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List all tables the registry can extract
    Tables {
        /// Catalog JSON to use instead of the embedded catalog
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

fn registry_for(catalog: Option<&Path>) -> Result<ExtractionRegistry, Box<dyn std::error::Error>> {
    let catalog = match catalog {
        Some(path) => Arc::new(Catalog::load(path)?),
        None => Catalog::embedded(),
    };
    Ok(ExtractionRegistry::new(catalog))
}

fn split_list(list: &str) -> Vec<&str> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = init_logger();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            tables,
            aliases,
            metadata,
        } => {
            let mut config = ExtractionConfig::load(&config)?;
            if let Some(tables) = tables {
                config.retain_tables(&split_list(&tables))?;
            }
            if let Some(aliases) = aliases {
                config.retain_aliases(&split_list(&aliases))?;
            }
            if metadata {
                config.write_metadata = true;
            }

            let registry = ExtractionRegistry::new(config.load_catalog()?);
            let start = Instant::now();
            let bar = IndicatifProgress::steps_bar(&multi, "Extracting", 0);
            let summary = run_extraction(&config, &registry, bar.as_ref())?;

            for diagnostic in &summary.diagnostics {
                log::debug!(
                    "[{}] {} ({}): {}",
                    diagnostic.alias,
                    diagnostic.table_id.as_deref().unwrap_or("*"),
                    diagnostic.kind,
                    diagnostic.message
                );
            }
            log::info!(
                "Wrote {} table(s) to {} in {:.1}s",
                summary.tables_written.len(),
                config.output_folder.display(),
                start.elapsed().as_secs_f64()
            );
        }
        Commands::Table {
            file,
            table_id,
            catalog,
            output,
        } => {
            let registry = registry_for(catalog.as_deref())?;
            let doc = read_document(&file)?;
            let extraction = extract_table(&doc, &table_id, &registry)?;

            if let Some(path) = output {
                let out = std::fs::File::create(&path)?;
                write_table_to(std::io::BufWriter::new(out), &extraction.table)?;
                log::info!(
                    "Wrote {} rows of Table {table_id} to {}",
                    extraction.table.row_count(),
                    path.display()
                );
            } else {
                let stdout = std::io::stdout();
                let mut lock = stdout.lock();
                write_table_to(&mut lock, &extraction.table)?;
                lock.flush()?;
            }
        }
        Commands::Tables { catalog } => {
            let registry = registry_for(catalog.as_deref())?;
            println!("{:<10} {:<24} LAYOUT", "TABLE", "FAMILY");
            println!("{}", "-".repeat(50));
            for table_id in registry.known_tables() {
                match registry.resolve(&table_id) {
                    Ok(strategy) => {
                        let family = strategy.family.to_string();
                        let layout = match &strategy.layout {
                            LayoutSource::Dynamic(_) => "dynamic".to_owned(),
                            LayoutSource::Matrix(_) => "matrix".to_owned(),
                            LayoutSource::Static(spec) => {
                                format!("fixed_width ({} columns)", spec.len())
                            }
                        };
                        println!("{table_id:<10} {family:<24} {layout}");
                    }
                    Err(e) => println!("{table_id:<10} {:<24} {e}", "-"),
                }
            }
        }
    }

    Ok(())
}
