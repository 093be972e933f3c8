//! Slices raw rows into typed cells.
//!
//! Handles lines shorter than the layout (blank fields), thousands
//! separators, and cells that fail numeric coercion (zero, logged at
//! `trace`).

use stops_prn_report_models::{Cell, Column, ColumnSpec, ExtractedTable};

/// Returns the byte range `start..end` of `line`, clamped to the line and
/// shrunk to the nearest character boundaries. Lines shorter than `start`
/// yield `""`.
#[must_use]
pub fn slice_field(line: &str, start: usize, end: usize) -> &str {
    let len = line.len();
    if start >= len {
        return "";
    }
    let mut start = start;
    while !line.is_char_boundary(start) {
        start += 1;
    }
    let mut end = end.min(len);
    while end > start && !line.is_char_boundary(end) {
        end -= 1;
    }
    if end <= start {
        return "";
    }
    &line[start..end]
}

/// Trims whitespace and column-rule pipes from a raw field.
#[must_use]
pub fn clean_field(raw: &str) -> &str {
    raw.trim_matches(|c: char| c.is_whitespace() || c == '|')
}

/// Whether a label reads `total`, ignoring case and padding.
#[must_use]
pub fn is_total_label(value: &str) -> bool {
    clean_field(value).eq_ignore_ascii_case("total")
}

/// Parses a cleaned field as a number.
///
/// Thousands separators are dropped. Blank fields and anything that does
/// not parse become `0`; the latter is logged at `trace`.
#[must_use]
pub fn coerce_numeric(table_id: &str, column: &str, value: &str) -> Cell {
    let digits: String = value.chars().filter(|c| *c != ',').collect();
    if digits.is_empty() {
        return Cell::Int(0);
    }
    if let Ok(n) = digits.parse::<i64>() {
        return Cell::Int(n);
    }
    if let Ok(x) = digits.parse::<f64>()
        && x.is_finite()
    {
        return Cell::Float(x);
    }

    log::trace!("Table {table_id}: {column} value {value:?} is not numeric, using 0");
    Cell::Int(0)
}

/// Whether `line` is a Total sentinel, judged by the byte spans of the
/// family's sentinel columns.
#[must_use]
pub fn is_sentinel_line(line: &str, spans: &[(usize, usize)]) -> bool {
    spans
        .iter()
        .any(|&(start, end)| is_total_label(slice_field(line, start, end)))
}

/// Builds a typed table from raw rows.
///
/// Columns named in `labels` stay text; every other column is coerced to
/// numbers. A row whose `sentinels` columns read `total` has every label
/// column rewritten to `"Total"`.
#[must_use]
pub fn materialize<'a>(
    table_id: &str,
    rows: impl IntoIterator<Item = &'a str>,
    spec: &ColumnSpec,
    labels: &[&str],
    sentinels: &[&str],
) -> ExtractedTable {
    let columns = spec
        .names()
        .map(|name| {
            if labels.contains(&name) {
                Column::label(name)
            } else {
                Column::numeric(name)
            }
        })
        .collect::<Vec<_>>();
    let mut table = ExtractedTable::new(table_id, columns);

    for line in rows {
        let fields: Vec<&str> = spec
            .columns()
            .iter()
            .map(|def| clean_field(slice_field(line, def.start, def.end)))
            .collect();

        let is_total = spec
            .columns()
            .iter()
            .zip(&fields)
            .any(|(def, field)| sentinels.contains(&def.name.as_str()) && is_total_label(field));

        let cells = spec
            .columns()
            .iter()
            .zip(fields)
            .map(|(def, field)| {
                if labels.contains(&def.name.as_str()) {
                    Cell::text(if is_total { "Total" } else { field })
                } else {
                    coerce_numeric(table_id, &def.name, field)
                }
            })
            .collect();

        table.push_row(cells);
    }

    table
}
