//! Run configuration.
//!
//! A run is described by a TOML file:
//!
//! ```toml
//! prn_folder = "prn"
//! output_folder = "extracted_tables"
//! tables = ["10.01", "9.01"]
//! write_metadata = true
//!
//! [[files]]
//! alias = "2024_Existing"
//! filename = "BASE2024.PRN"
//! ```
//!
//! `aliases_path` and `tables_path` may point at JSON files whose
//! contents replace `files` and `tables`. Relative paths are resolved
//! against the directory holding the configuration file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stops_prn_report::Catalog;

use crate::RunError;

/// One report file and the alias its tables are written under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAlias {
    /// Scenario/year/run label (e.g. `2024_Existing`).
    pub alias: String,
    /// File name relative to `prn_folder`.
    pub filename: String,
}

/// A table list entry: a bare id or an object with a `table_id` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TableRef {
    Id(String),
    Entry { table_id: String },
}

impl TableRef {
    fn into_id(self) -> String {
        match self {
            Self::Id(id) | Self::Entry { table_id: id } => id,
        }
    }
}

/// Everything needed to run a batch extraction.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// Directory holding the `.PRN` reports.
    pub prn_folder: PathBuf,
    /// Root directory for `Table_<id>/` output folders.
    pub output_folder: PathBuf,
    /// Catalog JSON replacing the embedded default catalog.
    #[serde(default)]
    pub catalog: Option<PathBuf>,
    /// Table ids to extract from every file.
    #[serde(default)]
    pub tables: Vec<String>,
    /// Files to process, in order.
    #[serde(default)]
    pub files: Vec<FileAlias>,
    /// JSON list of `{alias, filename}` objects replacing `files`.
    #[serde(default)]
    pub aliases_path: Option<PathBuf>,
    /// JSON list of table ids (or `{table_id}` objects) replacing `tables`.
    #[serde(default)]
    pub tables_path: Option<PathBuf>,
    /// Whether to write a `.meta.json` sidecar next to every CSV.
    #[serde(default)]
    pub write_metadata: bool,
}

fn read_to_string(path: &Path) -> Result<String, RunError> {
    std::fs::read_to_string(path).map_err(|source| RunError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, RunError> {
    let json = read_to_string(path)?;
    serde_json::from_str(&json).map_err(|source| RunError::Json {
        path: path.display().to_string(),
        source,
    })
}

fn resolve(base: &Path, path: &mut PathBuf) {
    if path.is_relative() {
        *path = base.join(&*path);
    }
}

impl ExtractionConfig {
    /// Loads, hydrates and validates a configuration file.
    ///
    /// # Errors
    ///
    /// * [`RunError::Io`] if the file or a linked file cannot be read
    /// * [`RunError::Toml`] / [`RunError::Json`] if a file is malformed
    /// * [`RunError::Config`] if no files or no tables remain
    pub fn load(path: &Path) -> Result<Self, RunError> {
        let text = read_to_string(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let config = Self::from_toml_str(&text, base)?;
        log::info!(
            "Loaded configuration {}: {} file(s), {} table(s)",
            path.display(),
            config.files.len(),
            config.tables.len()
        );
        Ok(config)
    }

    /// Parses, hydrates and validates configuration text, resolving
    /// relative paths against `base`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn from_toml_str(text: &str, base: &Path) -> Result<Self, RunError> {
        let mut config: Self = toml::from_str(text)?;
        config.resolve_paths(base);
        config.hydrate()?;
        config.validate()?;
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        resolve(base, &mut self.prn_folder);
        resolve(base, &mut self.output_folder);
        for path in [
            self.catalog.as_mut(),
            self.aliases_path.as_mut(),
            self.tables_path.as_mut(),
        ]
        .into_iter()
        .flatten()
        {
            resolve(base, path);
        }
    }

    /// Replaces `files` / `tables` with the contents of the linked JSON
    /// files. A linked file that does not exist is skipped with a warning.
    fn hydrate(&mut self) -> Result<(), RunError> {
        if let Some(path) = &self.aliases_path {
            if path.is_file() {
                let files: Vec<FileAlias> = read_json(path)?;
                log::info!("Loaded {} file alias(es) from {}", files.len(), path.display());
                self.files = files;
            } else {
                log::warn!("Aliases file {} not found; using inline files", path.display());
            }
        }

        if let Some(path) = &self.tables_path {
            if path.is_file() {
                let tables: Vec<TableRef> = read_json(path)?;
                log::info!("Loaded {} table id(s) from {}", tables.len(), path.display());
                self.tables = tables.into_iter().map(TableRef::into_id).collect();
            } else {
                log::warn!("Tables file {} not found; using inline tables", path.display());
            }
        }

        Ok(())
    }

    /// Checks that there is something to do.
    ///
    /// # Errors
    ///
    /// * [`RunError::Config`] if no files or no tables are configured, or
    ///   an alias is blank
    pub fn validate(&self) -> Result<(), RunError> {
        if self.files.is_empty() {
            return Err(RunError::Config("no files to process".to_owned()));
        }
        if self.tables.is_empty() {
            return Err(RunError::Config("no tables to extract".to_owned()));
        }
        if let Some(file) = self.files.iter().find(|f| f.alias.trim().is_empty()) {
            return Err(RunError::Config(format!(
                "file {:?} has a blank alias",
                file.filename
            )));
        }
        Ok(())
    }

    /// Keeps only the tables named in `ids`.
    ///
    /// # Errors
    ///
    /// * [`RunError::Config`] if none of `ids` is configured
    pub fn retain_tables(&mut self, ids: &[&str]) -> Result<(), RunError> {
        self.tables.retain(|t| ids.contains(&t.as_str()));
        if self.tables.is_empty() {
            return Err(RunError::Config(format!(
                "none of the requested tables ({}) is configured",
                ids.join(", ")
            )));
        }
        Ok(())
    }

    /// Keeps only the files whose alias is named in `aliases`.
    ///
    /// # Errors
    ///
    /// * [`RunError::Config`] if none of `aliases` is configured
    pub fn retain_aliases(&mut self, aliases: &[&str]) -> Result<(), RunError> {
        self.files.retain(|f| aliases.contains(&f.alias.as_str()));
        if self.files.is_empty() {
            return Err(RunError::Config(format!(
                "none of the requested aliases ({}) is configured",
                aliases.join(", ")
            )));
        }
        Ok(())
    }

    /// The catalog for this run: the configured file, or the embedded
    /// default.
    ///
    /// # Errors
    ///
    /// * [`RunError::Catalog`] if the configured catalog cannot be loaded
    pub fn load_catalog(&self) -> Result<std::sync::Arc<Catalog>, RunError> {
        match &self.catalog {
            Some(path) => Ok(std::sync::Arc::new(Catalog::load(path)?)),
            None => Ok(Catalog::embedded()),
        }
    }

    /// Full path of an alias's report file.
    #[must_use]
    pub fn report_path(&self, file: &FileAlias) -> PathBuf {
        self.prn_folder.join(&file.filename)
    }
}
