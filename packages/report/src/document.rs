//! Report file loading.

use std::path::Path;

use stops_prn_report_models::ReportDocument;

use crate::ExtractError;

/// Reads a report file into memory.
///
/// Invalid UTF-8 is replaced rather than rejected; PRN files are mostly
/// ASCII with the occasional Latin-1 station name.
///
/// # Errors
///
/// * [`ExtractError::FileAccess`] if the file is missing or unreadable
pub fn read_document(path: &Path) -> Result<ReportDocument, ExtractError> {
    let bytes = std::fs::read(path).map_err(|source| ExtractError::FileAccess {
        path: path.display().to_string(),
        source,
    })?;
    let doc = ReportDocument::from_text(&String::from_utf8_lossy(&bytes));
    log::debug!("Read {} lines from {}", doc.len(), path.display());
    Ok(doc)
}
