//! Per-table layout catalog.
//!
//! The catalog is a JSON array of [`CatalogEntry`] values. A default
//! catalog is embedded at compile time and parsed once per process; a
//! run may load its own file instead. Either way the result is shared
//! read-only behind an [`Arc`].

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use stops_prn_report_models::CatalogEntry;

/// Embedded default catalog.
const EMBEDDED_CATALOG: &str = include_str!("../catalog/tables.json");

/// Number of entries in the embedded catalog. Enforced by a test.
#[cfg(test)]
const EXPECTED_ENTRY_COUNT: usize = 6;

static EMBEDDED: LazyLock<Arc<Catalog>> = LazyLock::new(|| {
    Arc::new(
        Catalog::from_json_str(EMBEDDED_CATALOG)
            .unwrap_or_else(|e| panic!("Failed to parse embedded table catalog: {e}")),
    )
});

/// Errors raised while loading a catalog file.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("Cannot read catalog {path}: {source}")]
    Io {
        /// Path of the catalog file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The catalog is not a JSON array of entries.
    #[error("Malformed catalog: {0}")]
    Json(#[from] serde_json::Error),
}

/// Catalog entries keyed by table id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl Catalog {
    /// Parses a JSON array of entries.
    ///
    /// # Errors
    ///
    /// * [`CatalogError::Json`] if `json` is not an array of entries
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(json)?;
        Ok(Self::from_entries(entries))
    }

    /// Builds a catalog from entries. When a table id repeats, the first
    /// entry is kept.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        let mut catalog = Self::default();
        for entry in entries {
            catalog.append(entry);
        }
        catalog
    }

    /// Reads and parses a catalog file.
    ///
    /// # Errors
    ///
    /// * [`CatalogError::Io`] if the file cannot be read
    /// * [`CatalogError::Json`] if it is not an array of entries
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json_str(&json)?;
        log::info!(
            "Loaded {} catalog entries from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// The embedded default catalog.
    ///
    /// # Panics
    ///
    /// Panics if the embedded JSON fails to parse. It is a compile-time
    /// constant, so a failure is a development error caught by tests.
    #[must_use]
    pub fn embedded() -> Arc<Self> {
        Arc::clone(&EMBEDDED)
    }

    /// Adds an entry unless its table id is already present.
    ///
    /// Returns whether the entry was added.
    pub fn append(&mut self, entry: CatalogEntry) -> bool {
        if self.entries.contains_key(&entry.table_id) {
            log::warn!(
                "Duplicate catalog entry for table {}; keeping the first",
                entry.table_id
            );
            return false;
        }
        self.entries.insert(entry.table_id.clone(), entry);
        true
    }

    #[must_use]
    pub fn get(&self, table_id: &str) -> Option<&CatalogEntry> {
        self.entries.get(table_id)
    }

    /// Table ids in ascending string order.
    pub fn table_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
