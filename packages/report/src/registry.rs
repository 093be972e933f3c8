//! Maps table ids to extraction strategies.
//!
//! Resolution order for a table id:
//!
//! 1. A catalog entry. Its `extraction_function` names the family (or the
//!    built-in family for that id when absent) and its `format_type`
//!    chooses between the entry's own columns (`fixed_width`) and the
//!    family's header-derived layout (`dynamic`).
//! 2. The built-in id map: `9.01`, `10.01`, `10.02` and every `11.` table.
//! 3. Otherwise a configuration error for that table only.

use std::sync::Arc;

use stops_prn_report_models::{
    ColumnSpec, ExtractedTable, FormatType, ReportDocument, TableFamily, TableLocator,
};

use crate::ExtractError;
use crate::catalog::Catalog;
use crate::family::{
    DynamicLayout, FamilyProfile, LayoutRule, MatrixLayout, Normalization, profile,
};
use crate::layout;
use crate::materialize;
use crate::normalize;
use crate::rows::{self, RowCollector, RowRules};
use crate::scanner;

/// Built-in table ids and their families.
const BUILT_IN_TABLES: &[(&str, TableFamily)] = &[
    ("9.01", TableFamily::StopBoardings),
    ("10.01", TableFamily::RouteBoardings),
    ("10.02", TableFamily::RouteGroupBoardings),
];

/// Every table whose id starts with this prefix is a trip table.
const TRIP_TABLE_PREFIX: &str = "11.";

/// Where a strategy gets its columns.
#[derive(Debug, Clone)]
pub enum LayoutSource {
    /// Scenario groups read from the report header.
    Dynamic(&'static DynamicLayout),
    /// Destination columns read from the report header.
    Matrix(&'static MatrixLayout),
    /// Widths fixed by a `fixed_width` catalog entry.
    Static(ColumnSpec),
}

/// The resolved extraction strategy for one table id.
#[derive(Debug, Clone)]
pub struct TableStrategy {
    /// Table id the strategy was resolved for.
    pub table_id: String,
    /// Family whose profile drives extraction.
    pub family: TableFamily,
    /// Source of the column layout.
    pub layout: LayoutSource,
}

impl TableStrategy {
    #[must_use]
    pub const fn profile(&self) -> &'static FamilyProfile {
        profile(self.family)
    }

    /// Finds the table in `doc`.
    ///
    /// # Errors
    ///
    /// * [`ExtractError::NotFound`] if the table or its header is absent
    pub fn locate(&self, doc: &ReportDocument) -> Result<TableLocator, ExtractError> {
        scanner::locate(doc, &self.table_id, &self.profile().header)
    }

    /// Resolves and validates the column layout for a located table.
    ///
    /// # Errors
    ///
    /// * [`ExtractError::Configuration`] if the header yields no usable
    ///   layout or a required column is missing
    pub fn resolve_columns(
        &self,
        doc: &ReportDocument,
        locator: &TableLocator,
    ) -> Result<ColumnSpec, ExtractError> {
        let spec = match &self.layout {
            LayoutSource::Dynamic(dynamic) => {
                let group_row = doc.line(locator.first_header_index()).unwrap_or_default();
                layout::resolve_dynamic(&self.table_id, group_row, dynamic)?
            }
            LayoutSource::Matrix(matrix) => {
                let column_row = doc.line(locator.last_header_index()).unwrap_or_default();
                layout::resolve_matrix(&self.table_id, column_row, matrix)?
            }
            LayoutSource::Static(spec) => spec.clone(),
        };
        layout::validate(&self.table_id, &spec, self.profile().required_columns)?;
        Ok(spec)
    }

    /// Starts collecting the table's data lines.
    #[must_use]
    pub fn collect<'a>(
        &self,
        doc: &'a ReportDocument,
        locator: &TableLocator,
        spec: &ColumnSpec,
    ) -> RowCollector<'a> {
        let profile = self.profile();
        let sentinel_spans = spec
            .columns()
            .iter()
            .filter(|c| profile.sentinel_columns.contains(&c.name.as_str()))
            .map(|c| (c.start, c.end))
            .collect();
        rows::collect_rows(
            doc,
            locator,
            RowRules {
                terminator: profile.terminator,
                sentinel_spans,
            },
        )
    }

    /// Slices and types the collected rows.
    #[must_use]
    pub fn materialize<'a>(
        &self,
        rows: impl IntoIterator<Item = &'a str>,
        spec: &ColumnSpec,
    ) -> ExtractedTable {
        let profile = self.profile();
        materialize::materialize(
            &self.table_id,
            rows,
            spec,
            profile.label_columns,
            profile.sentinel_columns,
        )
    }

    /// Applies the family's normalization steps.
    #[must_use]
    pub fn normalize(&self, mut table: ExtractedTable) -> ExtractedTable {
        let profile = self.profile();
        match profile.normalization {
            Normalization::None => table,
            Normalization::ForwardFill(columns) => {
                for column in columns {
                    let filled = normalize::forward_fill(&mut table, column);
                    log::trace!("Table {}: forward-filled {filled} {column} cell(s)", self.table_id);
                }
                table
            }
            Normalization::RouteGroups => {
                normalize::regroup_routes(&mut table, profile.label_columns);
                table
            }
            Normalization::MatrixPivot => match &self.layout {
                LayoutSource::Matrix(matrix) => normalize::pivot_matrix(table, matrix),
                LayoutSource::Dynamic(_) | LayoutSource::Static(_) => table,
            },
        }
    }
}

/// Table id to strategy map, backed by an injected [`Catalog`].
#[derive(Debug, Clone)]
pub struct ExtractionRegistry {
    catalog: Arc<Catalog>,
}

impl Default for ExtractionRegistry {
    fn default() -> Self {
        Self::with_embedded_catalog()
    }
}

impl ExtractionRegistry {
    #[must_use]
    pub const fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// A registry backed by the embedded default catalog.
    #[must_use]
    pub fn with_embedded_catalog() -> Self {
        Self::new(Catalog::embedded())
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The family registered for `table_id` without a catalog entry.
    #[must_use]
    pub fn built_in_family(table_id: &str) -> Option<TableFamily> {
        BUILT_IN_TABLES
            .iter()
            .find(|(id, _)| *id == table_id)
            .map(|(_, family)| *family)
            .or_else(|| {
                table_id
                    .starts_with(TRIP_TABLE_PREFIX)
                    .then_some(TableFamily::TripCharacteristics)
            })
    }

    /// Resolves the strategy for `table_id`.
    ///
    /// # Errors
    ///
    /// * [`ExtractError::Configuration`] if no strategy is registered, the
    ///   catalog entry names an unknown family or format, or a
    ///   catalog-only family has no usable entry
    pub fn resolve(&self, table_id: &str) -> Result<TableStrategy, ExtractError> {
        let config_error = |message: String| ExtractError::Configuration {
            table_id: table_id.to_owned(),
            message,
        };

        let entry = self.catalog.get(table_id);
        let family = match entry.and_then(|e| e.extraction_function.as_deref()) {
            Some(tag) => tag
                .parse::<TableFamily>()
                .map_err(|_| config_error(format!("unknown extraction function {tag:?}")))?,
            None => Self::built_in_family(table_id)
                .ok_or_else(|| config_error("no extraction strategy registered".to_owned()))?,
        };

        let profile = profile(family);
        let layout = match entry {
            Some(entry) => {
                let format = entry.format_type.parse::<FormatType>().map_err(|_| {
                    config_error(format!("unknown format type {:?}", entry.format_type))
                })?;
                match format {
                    FormatType::FixedWidth => LayoutSource::Static(layout::from_catalog(entry)?),
                    FormatType::Dynamic => default_layout(profile.layout).ok_or_else(|| {
                        config_error(format!("{family} needs fixed_width catalog columns"))
                    })?,
                }
            }
            None => default_layout(profile.layout)
                .ok_or_else(|| config_error(format!("{family} needs a catalog entry")))?,
        };

        Ok(TableStrategy {
            table_id: table_id.to_owned(),
            family,
            layout,
        })
    }

    /// Every table id with a catalog entry or a fixed built-in mapping,
    /// in ascending string order.
    #[must_use]
    pub fn known_tables(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .catalog
            .table_ids()
            .map(str::to_owned)
            .chain(BUILT_IN_TABLES.iter().map(|(id, _)| (*id).to_owned()))
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

const fn default_layout(rule: LayoutRule) -> Option<LayoutSource> {
    match rule {
        LayoutRule::Dynamic(dynamic) => Some(LayoutSource::Dynamic(dynamic)),
        LayoutRule::Matrix(matrix) => Some(LayoutSource::Matrix(matrix)),
        LayoutRule::Catalog => None,
    }
}
