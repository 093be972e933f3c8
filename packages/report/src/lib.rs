#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Fixed-width table extraction engine for STOPS PRN reports.
//!
//! The pipeline for one `(document, table_id)` pair is:
//!
//! 1. [`registry::ExtractionRegistry::resolve`] picks the strategy.
//! 2. [`scanner::locate`] finds the marker, header rows and data body.
//! 3. [`metadata::harvest`] reads the run banner above the marker.
//! 4. [`layout`] resolves the column layout from the header or catalog.
//! 5. [`rows::collect_rows`] yields the raw data lines.
//! 6. [`materialize::materialize`] slices and types the fields.
//! 7. [`normalize`] forward-fills, regroups or pivots.
//!
//! [`extract_table`] runs the whole pipeline and returns an error;
//! [`extract_or_empty`] converts that error into an empty table plus a
//! logged [`Diagnostic`] so batch callers can keep going.

pub mod catalog;
pub mod document;
pub mod family;
pub mod layout;
pub mod materialize;
pub mod metadata;
pub mod normalize;
pub mod registry;
pub mod rows;
pub mod scanner;

#[cfg(test)]
mod fixtures;

use serde::{Deserialize, Serialize};
use stops_prn_report_models::{ExtractedTable, MetadataBlock, ReportDocument, TableLocator};
use strum_macros::{AsRefStr, Display, EnumString};

pub use catalog::{Catalog, CatalogError};
pub use document::read_document;
pub use registry::{ExtractionRegistry, TableStrategy};

/// Errors that end the extraction of a single table.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The table, its header, or its separator is absent.
    #[error("Table {table_id} not found: {reason}")]
    NotFound {
        /// Requested table id.
        table_id: String,
        /// What was missing.
        reason: String,
    },

    /// No usable strategy or layout for the table.
    #[error("Configuration error for table {table_id}: {message}")]
    Configuration {
        /// Requested table id.
        table_id: String,
        /// Description of what went wrong.
        message: String,
    },

    /// The source report could not be read.
    #[error("Cannot read {path}: {source}")]
    FileAccess {
        /// Path of the report.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ExtractError {
    /// The diagnostic category of this error.
    #[must_use]
    pub const fn kind(&self) -> DiagnosticKind {
        match self {
            Self::NotFound { .. } => DiagnosticKind::NotFound,
            Self::Configuration { .. } => DiagnosticKind::Configuration,
            Self::FileAccess { .. } => DiagnosticKind::FileAccess,
        }
    }
}

/// Category of a non-fatal extraction failure.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DiagnosticKind {
    /// The table is absent or has no data rows.
    NotFound,
    /// No strategy or column layout resolves for the table.
    Configuration,
    /// The report file could not be read.
    FileAccess,
}

/// A recorded, non-fatal failure for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Table the failure belongs to.
    pub table_id: String,
    /// Failure category.
    pub kind: DiagnosticKind,
    /// Human-readable failure message.
    pub message: String,
}

impl Diagnostic {
    #[must_use]
    pub fn from_error(table_id: &str, error: &ExtractError) -> Self {
        Self {
            table_id: table_id.to_owned(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }

    /// Logs the diagnostic: missing tables and files at `warn`,
    /// configuration problems at `error`.
    pub fn log(&self) {
        match self.kind {
            DiagnosticKind::NotFound | DiagnosticKind::FileAccess => {
                log::warn!("{}", self.message);
            }
            DiagnosticKind::Configuration => log::error!("{}", self.message),
        }
    }
}

/// A successfully extracted table with its context.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// The normalized table.
    pub table: ExtractedTable,
    /// Banner fields from the page holding the table.
    pub metadata: MetadataBlock,
    /// Where the table was found in the report.
    pub locator: TableLocator,
}

/// Extracts `table_id` from `doc`.
///
/// # Errors
///
/// * [`ExtractError::Configuration`] if no strategy or layout resolves
/// * [`ExtractError::NotFound`] if the table is absent or has no data rows
pub fn extract_table(
    doc: &ReportDocument,
    table_id: &str,
    registry: &ExtractionRegistry,
) -> Result<Extraction, ExtractError> {
    let strategy = registry.resolve(table_id)?;
    let locator = strategy.locate(doc)?;
    let metadata = metadata::harvest(doc, locator.marker_index);
    let spec = strategy.resolve_columns(doc, &locator)?;

    let rows: Vec<&str> = strategy.collect(doc, &locator, &spec).collect();
    if rows.is_empty() {
        return Err(ExtractError::NotFound {
            table_id: table_id.to_owned(),
            reason: "no data rows".to_owned(),
        });
    }

    let table = strategy.materialize(rows, &spec);
    let table = strategy.normalize(table);
    log::debug!(
        "Table {table_id} ({}): {} rows x {} columns",
        strategy.family,
        table.row_count(),
        table.column_count()
    );

    Ok(Extraction {
        table,
        metadata,
        locator,
    })
}

/// The result of extracting one table at a batch boundary.
#[derive(Debug, Clone)]
pub struct TableOutcome {
    /// The extracted table, empty on failure.
    pub table: ExtractedTable,
    /// Banner fields, default on failure.
    pub metadata: MetadataBlock,
    /// Why the table is empty, if it is.
    pub diagnostic: Option<Diagnostic>,
}

/// Extracts `table_id`, converting any failure into an empty table and a
/// logged [`Diagnostic`].
#[must_use]
pub fn extract_or_empty(
    doc: &ReportDocument,
    table_id: &str,
    registry: &ExtractionRegistry,
) -> TableOutcome {
    match extract_table(doc, table_id, registry) {
        Ok(extraction) => TableOutcome {
            table: extraction.table,
            metadata: extraction.metadata,
            diagnostic: None,
        },
        Err(e) => {
            let diagnostic = Diagnostic::from_error(table_id, &e);
            diagnostic.log();
            TableOutcome {
                table: ExtractedTable::empty(table_id),
                metadata: MetadataBlock::default(),
                diagnostic: Some(diagnostic),
            }
        }
    }
}
