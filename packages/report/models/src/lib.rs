#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Document, layout, and table types for STOPS report extraction.
//!
//! A STOPS `.PRN` report is a paginated, fixed-width text file organized
//! into numbered tables. The engine in `stops_prn_report` reads a
//! [`ReportDocument`], finds a [`TableLocator`] for one table, resolves a
//! [`ColumnSpec`], and produces an [`ExtractedTable`] of typed [`Cell`]s.
//! Per-table layouts that cannot be derived from header text come from
//! [`CatalogEntry`] reference data.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

// ── Documents and locators ───────────────────────────────────────────────

/// The full, ordered line sequence of one source report.
///
/// Immutable once built; every extraction call scans it from the top.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportDocument {
    lines: Vec<String>,
}

impl ReportDocument {
    /// Splits `text` into lines, dropping `\n` / `\r\n` terminators.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_owned).collect(),
        }
    }

    /// All lines in source order.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The line at `index`, if any.
    #[must_use]
    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// Number of lines.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the document has no lines at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Line indices bounding one table inside a [`ReportDocument`].
///
/// Only constructed once a header anchor and the `=` separator that
/// follows it have both been found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLocator {
    /// Table identifier (e.g. `"10.01"`).
    pub table_id: String,
    /// Line holding the `Table <id>` marker.
    pub marker_index: usize,
    /// Header rows in order: the scenario group row (when the family has
    /// one) followed by the column-name row.
    pub header_indices: Vec<usize>,
    /// Line holding the `=====` separator under the header.
    pub separator_index: usize,
    /// First line after the separator.
    pub data_start_index: usize,
    /// Exclusive end of the data body: the next table marker, the next
    /// page banner, or the end of the document.
    pub data_end_index: usize,
}

impl TableLocator {
    /// The first header row (the scenario group row for two-row headers).
    #[must_use]
    pub fn first_header_index(&self) -> usize {
        self.header_indices
            .first()
            .copied()
            .unwrap_or(self.separator_index)
    }

    /// The last header row, i.e. the row directly naming the columns.
    #[must_use]
    pub fn last_header_index(&self) -> usize {
        self.header_indices
            .last()
            .copied()
            .unwrap_or(self.separator_index)
    }
}

/// Free-form run information printed in the page banner above a table.
///
/// Every field is optional; a report without a banner simply yields an
/// empty block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetadataBlock {
    /// Program name from `Program <name> - Version: ...`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    /// Version, with the release date appended when present
    /// (e.g. `"2.52 - 03/15/2024"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Run name from `Run: <name>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,
    /// System name from `System: <name>` on the run line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Page number from `Page <n>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
}

impl MetadataBlock {
    /// Whether no field was harvested.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.program.is_none()
            && self.version.is_none()
            && self.run.is_none()
            && self.system.is_none()
            && self.page.is_none()
    }
}

// ── Column layouts ───────────────────────────────────────────────────────

/// One fixed-width column: a name and a half-open byte range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Output column name.
    pub name: String,
    /// Inclusive start offset.
    pub start: usize,
    /// Exclusive end offset.
    pub end: usize,
}

impl ColumnDef {
    /// Width in bytes.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.end.saturating_sub(self.start)
    }
}

/// Ordered column layout for one table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    columns: Vec<ColumnDef>,
}

impl ColumnSpec {
    /// Builds a layout from `(name, width)` pairs laid out back to back
    /// from offset zero.
    #[must_use]
    pub fn from_widths<'a>(widths: impl IntoIterator<Item = (&'a str, usize)>) -> Self {
        let mut spec = Self::default();
        let mut offset = 0;
        for (name, width) in widths {
            spec.push(name, offset, offset + width);
            offset += width;
        }
        spec
    }

    /// Appends a column.
    pub fn push(&mut self, name: impl Into<String>, start: usize, end: usize) {
        self.columns.push(ColumnDef {
            name: name.into(),
            start,
            end,
        });
    }

    /// Columns in order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Column names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Looks a column up by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Number of columns.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the layout has no columns.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

// ── Extracted tables ─────────────────────────────────────────────────────

/// Whether a column holds text labels or numbers.
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
pub enum ColumnKind {
    /// Identifiers and names, kept as trimmed strings.
    Label,
    /// Counts and measures, coerced to numbers.
    Numeric,
}

/// A named, typed column of an [`ExtractedTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Column type.
    pub kind: ColumnKind,
}

impl Column {
    /// A label column.
    #[must_use]
    pub fn label(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Label,
        }
    }

    /// A numeric column.
    #[must_use]
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Numeric,
        }
    }
}

/// One materialized cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Trimmed label text (possibly empty).
    Text(String),
    /// Whole-number measure.
    Int(i64),
    /// Fractional measure.
    Float(f64),
}

impl Cell {
    /// Shorthand for a text cell.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// The label text, if this is a text cell.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Int(_) | Self::Float(_) => None,
        }
    }

    /// The numeric value, if this is a numeric cell.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Text(_) => None,
            Self::Int(n) => Some(*n as f64),
            Self::Float(f) => Some(*f),
        }
    }

    /// Whether this is an empty text cell.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.is_empty())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
        }
    }
}

/// A rectangular, typed table extracted from one report.
///
/// Rows keep source order. Every row has exactly one cell per column.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedTable {
    /// Table identifier (e.g. `"10.01"`).
    pub table_id: String,
    columns: Vec<Column>,
    rows: Vec<Vec<Cell>>,
}

impl ExtractedTable {
    /// Creates a table with the given columns and no rows.
    #[must_use]
    pub fn new(table_id: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            table_id: table_id.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// The empty result returned when a table could not be extracted.
    #[must_use]
    pub fn empty(table_id: impl Into<String>) -> Self {
        Self::new(table_id, Vec::new())
    }

    /// Appends a row. Short rows are padded with blank text and long rows
    /// truncated so the table stays rectangular.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Text(String::new()));
        self.rows.push(row);
    }

    /// Columns in order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Position of the named column.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Rows in source order.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Mutable access to the rows, for in-place normalization.
    pub fn rows_mut(&mut self) -> &mut [Vec<Cell>] {
        &mut self.rows
    }

    /// The cell at `row` in the named column.
    #[must_use]
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// All cells of the named column, top to bottom.
    pub fn column_values<'a>(&'a self, column: &str) -> impl Iterator<Item = &'a Cell> + 'a {
        let idx = self.column_index(column);
        self.rows
            .iter()
            .filter_map(move |r| idx.and_then(|i| r.get(i)))
    }

    /// Inserts a column at `index` with one value per existing row.
    ///
    /// Missing values are filled with blank text.
    pub fn insert_column(&mut self, index: usize, column: Column, values: Vec<Cell>) {
        let index = index.min(self.columns.len());
        self.columns.insert(index, column);
        let mut values = values.into_iter();
        for row in &mut self.rows {
            row.insert(
                index,
                values.next().unwrap_or_else(|| Cell::Text(String::new())),
            );
        }
    }

    /// Number of rows.
    #[must_use]
    pub const fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    #[must_use]
    pub const fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Whether the table holds no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ── Catalog and table families ───────────────────────────────────────────

/// Extraction strategy family. Each family fixes the header anchor, the
/// column layout rule, the row terminator and the normalization steps for
/// the tables registered under it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TableFamily {
    /// Boardings per route by access mode (Table 10.01).
    RouteBoardings,
    /// Boardings per stop by access mode (Table 9.01).
    StopBoardings,
    /// Boardings per route with indented segment groups (Table 10.02).
    RouteGroupBoardings,
    /// Trips by household cars, sub-mode and access mode (Tables 11.xx).
    TripCharacteristics,
    /// Origin-by-destination district trip matrix.
    DistrictMatrix,
}

impl TableFamily {
    /// Every family, in declaration order.
    pub const ALL: &[Self] = &[
        Self::RouteBoardings,
        Self::StopBoardings,
        Self::RouteGroupBoardings,
        Self::TripCharacteristics,
        Self::DistrictMatrix,
    ];
}

/// How a catalog entry's columns are obtained.
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
pub enum FormatType {
    /// Columns listed verbatim in the entry, as widths.
    FixedWidth,
    /// Columns derived from header text by the family's rule.
    Dynamic,
}

/// A column of a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogColumn {
    /// Output column name.
    pub name: String,
    /// Width in bytes.
    pub width: usize,
}

fn default_format_type() -> String {
    FormatType::FixedWidth.to_string()
}

/// External reference data describing how to extract one table.
///
/// `format_type` and `extraction_function` are kept as raw strings so
/// that an unknown value invalidates only this entry's table, not the
/// whole catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Table identifier (e.g. `"11.01"`).
    pub table_id: String,
    /// `"fixed_width"` or `"dynamic"`.
    #[serde(default = "default_format_type")]
    pub format_type: String,
    /// Columns as `(name, width)` pairs, laid out back to back.
    #[serde(default)]
    pub columns: Vec<CatalogColumn>,
    /// [`TableFamily`] tag in `snake_case`.
    #[serde(default)]
    pub extraction_function: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_splits_text_into_lines() {
        let doc = ReportDocument::from_text("Table 9.01\r\n\nR1  10\n");
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.line(0), Some("Table 9.01"));
        assert_eq!(doc.line(1), Some(""));
        assert_eq!(doc.line(3), None);
        assert!(ReportDocument::from_text("").is_empty());
    }

    #[test]
    fn column_spec_from_widths_is_cumulative() {
        let spec = ColumnSpec::from_widths([("a", 9), ("b", 20), ("c", 14)]);
        let offsets: Vec<(usize, usize)> = spec.columns().iter().map(|c| (c.start, c.end)).collect();
        assert_eq!(offsets, vec![(0, 9), (9, 29), (29, 43)]);
        assert_eq!(spec.get("c").map(ColumnDef::width), Some(14));
    }

    #[test]
    fn push_row_keeps_table_rectangular() {
        let mut table =
            ExtractedTable::new("1.01", vec![Column::label("a"), Column::numeric("b")]);
        table.push_row(vec![Cell::text("x")]);
        table.push_row(vec![Cell::text("y"), Cell::Int(1), Cell::Int(2)]);
        assert_eq!(table.rows()[0], vec![Cell::text("x"), Cell::text("")]);
        assert_eq!(table.rows()[1].len(), 2);
    }

    #[test]
    fn insert_column_shifts_existing_cells() {
        let mut table =
            ExtractedTable::new("1.01", vec![Column::label("a"), Column::numeric("b")]);
        table.push_row(vec![Cell::text("x"), Cell::Int(1)]);
        table.insert_column(1, Column::label("mid"), vec![Cell::text("m")]);
        assert_eq!(
            table.column_names().collect::<Vec<_>>(),
            vec!["a", "mid", "b"]
        );
        assert_eq!(table.cell(0, "mid"), Some(&Cell::text("m")));
        assert_eq!(table.cell(0, "b"), Some(&Cell::Int(1)));
    }

    #[test]
    fn cell_display_prints_plain_numbers() {
        assert_eq!(Cell::Int(1_234).to_string(), "1234");
        assert_eq!(Cell::Float(12.5).to_string(), "12.5");
        assert_eq!(Cell::text("Red&T").to_string(), "Red&T");
    }

    #[test]
    fn table_family_round_trips_snake_case_tags() {
        for family in TableFamily::ALL {
            let tag = family.to_string();
            assert_eq!(tag.parse::<TableFamily>().ok(), Some(*family));
        }
        assert_eq!(
            "route_group_boardings".parse::<TableFamily>().ok(),
            Some(TableFamily::RouteGroupBoardings)
        );
    }

    #[test]
    fn metadata_block_serializes_pascal_case_without_gaps() {
        let block = MetadataBlock {
            program: Some("STOPS".to_owned()),
            page: Some("12".to_owned()),
            ..MetadataBlock::default()
        };
        let json = serde_json::to_string(&block).unwrap();
        assert_eq!(json, r#"{"Program":"STOPS","Page":"12"}"#);
    }
}
