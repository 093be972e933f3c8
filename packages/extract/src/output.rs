//! CSV and metadata writers.
//!
//! Output layout, relied on by downstream report builders:
//!
//! ```text
//! <output_folder>/Table_10_01/[2024_Existing]__Table_10_01.csv
//! <output_folder>/Table_10_01/[2024_Existing]__Table_10_01.meta.json
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use stops_prn_report_models::{ExtractedTable, MetadataBlock};

/// Errors raised while writing output files.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// A directory or file could not be created or written.
    #[error("Cannot write {path}: {source}")]
    Io {
        /// Path being written.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Metadata serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// `10.01` becomes `Table_10_01`.
#[must_use]
pub fn table_folder_name(table_id: &str) -> String {
    format!("Table_{}", table_id.replace('.', "_"))
}

/// `("2024_Existing", "10.01")` becomes `[2024_Existing]__Table_10_01.csv`.
#[must_use]
pub fn table_file_name(alias: &str, table_id: &str) -> String {
    format!("[{alias}]__{}.csv", table_folder_name(table_id))
}

/// Sidecar name next to [`table_file_name`].
#[must_use]
pub fn metadata_file_name(alias: &str, table_id: &str) -> String {
    format!("[{alias}]__{}.meta.json", table_folder_name(table_id))
}

/// Writes `table` as CSV: one header row of column names, then one
/// record per row, no index column.
///
/// # Errors
///
/// * [`OutputError::Csv`] if a record cannot be written
pub fn write_table_to<W: Write>(writer: W, table: &ExtractedTable) -> Result<(), OutputError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(table.column_names())?;
    for row in table.rows() {
        csv.write_record(row.iter().map(ToString::to_string))?;
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn create_dir(dir: &Path) -> Result<(), OutputError> {
    std::fs::create_dir_all(dir).map_err(|source| OutputError::Io {
        path: dir.display().to_string(),
        source,
    })
}

/// Writes `table` under `output_root` and returns the CSV path.
///
/// # Errors
///
/// * [`OutputError::Io`] if the folder or file cannot be created
/// * [`OutputError::Csv`] if a record cannot be written
pub fn write_table(
    output_root: &Path,
    alias: &str,
    table: &ExtractedTable,
) -> Result<PathBuf, OutputError> {
    let dir = output_root.join(table_folder_name(&table.table_id));
    create_dir(&dir)?;

    let path = dir.join(table_file_name(alias, &table.table_id));
    let file = std::fs::File::create(&path).map_err(|source| OutputError::Io {
        path: path.display().to_string(),
        source,
    })?;
    write_table_to(std::io::BufWriter::new(file), table)?;

    log::info!(
        "Wrote {} rows of Table {} to {}",
        table.row_count(),
        table.table_id,
        path.display()
    );
    Ok(path)
}

#[derive(Serialize)]
struct MetadataSidecar<'a> {
    alias: &'a str,
    table_id: &'a str,
    source_file: String,
    rows: usize,
    columns: Vec<&'a str>,
    report: &'a MetadataBlock,
    extraction_timestamp: String,
}

/// Writes the harvested banner and table shape next to the CSV and
/// returns the sidecar path.
///
/// # Errors
///
/// * [`OutputError::Io`] if the folder or file cannot be written
/// * [`OutputError::Json`] if serialization fails
pub fn write_metadata(
    output_root: &Path,
    alias: &str,
    source_file: &Path,
    table: &ExtractedTable,
    metadata: &MetadataBlock,
) -> Result<PathBuf, OutputError> {
    let dir = output_root.join(table_folder_name(&table.table_id));
    create_dir(&dir)?;

    let sidecar = MetadataSidecar {
        alias,
        table_id: &table.table_id,
        source_file: source_file.display().to_string(),
        rows: table.row_count(),
        columns: table.column_names().collect(),
        report: metadata,
        extraction_timestamp: chrono::Utc::now().to_rfc3339(),
    };
    let json = serde_json::to_string_pretty(&sidecar)?;

    let path = dir.join(metadata_file_name(alias, &table.table_id));
    std::fs::write(&path, json).map_err(|source| OutputError::Io {
        path: path.display().to_string(),
        source,
    })?;
    log::debug!("Wrote metadata to {}", path.display());
    Ok(path)
}
