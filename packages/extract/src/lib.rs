#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Batch extraction of STOPS PRN tables to CSV.
//!
//! [`run_extraction`] walks every configured `(file, table)` pair, runs
//! the extraction engine on each, and writes non-empty tables under
//! `Table_<id>/` folders. Per-table and per-file failures are recorded
//! as [`RunDiagnostic`]s and never abort the run; only configuration and
//! output-write failures are fatal.

pub mod config;
pub mod output;
pub mod progress;

use std::path::PathBuf;

use serde::Serialize;
use stops_prn_report::{
    CatalogError, DiagnosticKind, ExtractionRegistry, extract_or_empty, read_document,
};

pub use config::{ExtractionConfig, FileAlias};
pub use output::OutputError;
pub use progress::{NullProgress, ProgressCallback, null_progress};

/// Fatal errors that stop a batch run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The configuration is unusable.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A configuration or linked file could not be read.
    #[error("Cannot read {path}: {source}")]
    Io {
        /// Path being read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A linked aliases or tables file is not valid JSON.
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        /// Path of the linked file.
        path: String,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The configured catalog could not be loaded.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// An output file could not be written.
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// A non-fatal failure recorded during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunDiagnostic {
    /// Alias of the report file the failure belongs to.
    pub alias: String,
    /// `None` when the whole file was skipped.
    pub table_id: Option<String>,
    /// Failure category.
    pub kind: DiagnosticKind,
    /// Human-readable failure message.
    pub message: String,
}

/// What a batch run did.
#[derive(Debug, Default, Clone, Serialize)]
pub struct RunSummary {
    /// Report files that were read and scanned.
    pub files_processed: usize,
    /// Report files that could not be read.
    pub files_skipped: usize,
    /// CSV files written, in processing order.
    pub tables_written: Vec<PathBuf>,
    /// Non-fatal failures, in processing order.
    pub diagnostics: Vec<RunDiagnostic>,
}

/// Extracts every configured table from every configured file.
///
/// A missing or unreadable report file is recorded and skipped. A table
/// that cannot be extracted is recorded and produces no output file.
///
/// # Errors
///
/// * [`RunError::Output`] if a CSV or metadata file cannot be written
pub fn run_extraction(
    config: &ExtractionConfig,
    registry: &ExtractionRegistry,
    progress: &dyn ProgressCallback,
) -> Result<RunSummary, RunError> {
    let table_count = config.tables.len() as u64;
    progress.set_total(config.files.len() as u64 * table_count);

    let mut summary = RunSummary::default();

    for file in &config.files {
        let path = config.report_path(file);
        progress.set_message(file.alias.clone());

        let doc = match read_document(&path) {
            Ok(doc) => doc,
            Err(e) => {
                log::warn!("[{}] Skipping {}: {e}", file.alias, path.display());
                summary.diagnostics.push(RunDiagnostic {
                    alias: file.alias.clone(),
                    table_id: None,
                    kind: e.kind(),
                    message: e.to_string(),
                });
                summary.files_skipped += 1;
                progress.inc(table_count);
                continue;
            }
        };
        log::info!("[{}] Processing {}", file.alias, path.display());

        for table_id in &config.tables {
            let outcome = extract_or_empty(&doc, table_id, registry);

            if let Some(diagnostic) = outcome.diagnostic {
                summary.diagnostics.push(RunDiagnostic {
                    alias: file.alias.clone(),
                    table_id: Some(diagnostic.table_id),
                    kind: diagnostic.kind,
                    message: diagnostic.message,
                });
            } else if outcome.table.is_empty() {
                log::debug!("[{}] Table {table_id} is empty; not written", file.alias);
            } else {
                let written =
                    output::write_table(&config.output_folder, &file.alias, &outcome.table)
                        .inspect_err(|e| log::error!("[{}] {e}", file.alias))?;
                if config.write_metadata {
                    output::write_metadata(
                        &config.output_folder,
                        &file.alias,
                        &path,
                        &outcome.table,
                        &outcome.metadata,
                    )
                    .inspect_err(|e| log::error!("[{}] {e}", file.alias))?;
                }
                summary.tables_written.push(written);
            }

            progress.inc(1);
        }

        summary.files_processed += 1;
    }

    progress.finish(format!(
        "{} table(s) written, {} diagnostic(s)",
        summary.tables_written.len(),
        summary.diagnostics.len()
    ));
    log::info!(
        "Extraction complete: {} file(s) processed, {} skipped, {} table(s) written, {} diagnostic(s)",
        summary.files_processed,
        summary.files_skipped,
        summary.tables_written.len(),
        summary.diagnostics.len()
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn route_row(id: &str, name: &str, count: &str, values: &[&str]) -> String {
        let mut line = format!("{id:<20}{name:<36}{count:>9}");
        for value in values {
            line.push_str(&format!("{value:>10}"));
        }
        line
    }

    fn route_report() -> String {
        [
            "Program STOPS - Version: 2.52 - 03/15/2024".to_owned(),
            "Run: BASE2024 System: MBTA".to_owned(),
            "Page 12".to_owned(),
            "Table 10.01 - Boardings by Route".to_owned(),
            format!("{}Y2024 EXISTING", " ".repeat(65)),
            route_row("Route_ID", "Route_Name", "Count", &["WLK", "KNR"]),
            "=".repeat(85),
            route_row("R1", "Route One", "100", &["50", "50"]),
            route_row("Total", "Total", "100", &["50", "50"]),
            String::new(),
        ]
        .join("\n")
    }

    fn setup(dir: &Path, write_metadata: bool) -> ExtractionConfig {
        let prn = dir.join("prn");
        std::fs::create_dir_all(&prn).unwrap();
        std::fs::write(prn.join("BASE2024.PRN"), route_report()).unwrap();

        let text = format!(
            r#"
prn_folder = "prn"
output_folder = "out"
tables = ["10.01", "9.01"]
write_metadata = {write_metadata}

[[files]]
alias = "2024_Existing"
filename = "BASE2024.PRN"

[[files]]
alias = "2050_Build"
filename = "BUILD2050.PRN"
"#
        );
        ExtractionConfig::from_toml_str(&text, dir).unwrap()
    }

    #[test]
    fn writes_found_tables_and_records_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let config = setup(dir.path(), false);
        let registry = ExtractionRegistry::with_embedded_catalog();

        let summary = run_extraction(&config, &registry, &NullProgress).unwrap();

        assert_eq!(summary.files_processed, 1);
        assert_eq!(summary.files_skipped, 1);
        assert_eq!(
            summary.tables_written,
            vec![
                dir.path()
                    .join("out")
                    .join("Table_10_01")
                    .join("[2024_Existing]__Table_10_01.csv")
            ]
        );

        let kinds: Vec<_> = summary
            .diagnostics
            .iter()
            .map(|d| (d.alias.as_str(), d.table_id.as_deref(), d.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("2024_Existing", Some("9.01"), DiagnosticKind::NotFound),
                ("2050_Build", None, DiagnosticKind::FileAccess),
            ]
        );

        assert!(!dir.path().join("out").join("Table_9_01").exists());
        let csv = std::fs::read_to_string(&summary.tables_written[0]).unwrap();
        assert_eq!(
            csv.lines().next(),
            Some(
                "Route_ID,Route_Name,Count,Y2024_EXISTING_WLK,Y2024_EXISTING_KNR,\
                 Y2024_EXISTING_PNR,Y2024_EXISTING_ALL"
            )
        );
        assert_eq!(csv.lines().count(), 3);
    }

    #[derive(Default)]
    struct RecordingProgress {
        total: AtomicU64,
        position: AtomicU64,
        messages: Mutex<Vec<String>>,
        finished: Mutex<Option<String>>,
    }

    impl ProgressCallback for RecordingProgress {
        fn set_total(&self, total: u64) {
            self.total.store(total, Ordering::SeqCst);
        }

        fn inc(&self, delta: u64) {
            self.position.fetch_add(delta, Ordering::SeqCst);
        }

        fn set_message(&self, msg: String) {
            self.messages.lock().unwrap().push(msg);
        }

        fn finish(&self, msg: String) {
            *self.finished.lock().unwrap() = Some(msg);
        }
    }

    #[test]
    fn progress_counts_every_file_table_pair() {
        let dir = tempfile::tempdir().unwrap();
        let config = setup(dir.path(), false);
        let registry = ExtractionRegistry::with_embedded_catalog();
        let progress = RecordingProgress::default();

        run_extraction(&config, &registry, &progress).unwrap();

        assert_eq!(progress.total.load(Ordering::SeqCst), 4);
        assert_eq!(progress.position.load(Ordering::SeqCst), 4);
        assert_eq!(
            *progress.messages.lock().unwrap(),
            vec!["2024_Existing".to_owned(), "2050_Build".to_owned()]
        );
        assert_eq!(
            progress.finished.lock().unwrap().as_deref(),
            Some("1 table(s) written, 2 diagnostic(s)")
        );
    }

    #[test]
    fn metadata_sidecar_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        let sidecar = dir
            .path()
            .join("out")
            .join("Table_10_01")
            .join("[2024_Existing]__Table_10_01.meta.json");
        let registry = ExtractionRegistry::with_embedded_catalog();

        run_extraction(&setup(dir.path(), false), &registry, &NullProgress).unwrap();
        assert!(!sidecar.exists());

        let progress = null_progress();
        run_extraction(&setup(dir.path(), true), &registry, progress.as_ref()).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(sidecar).unwrap()).unwrap();
        assert_eq!(value["report"]["Run"], "BASE2024");
        assert_eq!(value["rows"], 2);
    }

    #[test]
    fn unwritable_output_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = setup(dir.path(), false);
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        config.output_folder = blocker;

        let registry = ExtractionRegistry::with_embedded_catalog();
        let err = run_extraction(&config, &registry, &NullProgress).unwrap_err();
        assert!(matches!(err, RunError::Output(OutputError::Io { .. })));
        assert!(err.to_string().contains("blocker"));
    }
}
