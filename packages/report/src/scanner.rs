//! Locates a table's marker, header rows, separator and data body.
//!
//! Reports mention a table id more than once (table of contents, cross
//! references), so every `Table <id>` occurrence is tried in order until
//! one is followed by the family's header rows and an `=` separator
//! before the next table marker.

use std::sync::LazyLock;

use regex::Regex;
use stops_prn_report_models::{ReportDocument, TableLocator};

use crate::ExtractError;
use crate::family::HeaderRule;

/// Any `Table <major>.<minor>` marker.
static ANY_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bTable\s+\d+\.\d+").expect("valid regex"));

/// The banner line printed at the top of every page.
static PAGE_BANNER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*Program\s+\S.*\s-\s+Version:").expect("valid regex"));

/// A scenario group heading such as `Y2024 EXISTING` or `Y2050 NO-BUILD`.
pub(crate) static YEAR_GROUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bY\d{4}\s+[\w-]+").expect("valid regex"));

/// How many lines after a header row its successor may appear.
const HEADER_REACH: usize = 3;

fn marker_pattern(table_id: &str) -> Result<Regex, ExtractError> {
    Regex::new(&format!(
        r"\bTable\s+{}(?:[^\w.]|$)",
        regex::escape(table_id)
    ))
    .map_err(|e| ExtractError::Configuration {
        table_id: table_id.to_owned(),
        message: format!("invalid table id: {e}"),
    })
}

/// Whether `line` carries any table marker.
#[must_use]
pub fn is_table_marker(line: &str) -> bool {
    ANY_MARKER_RE.is_match(line)
}

/// Whether `line` starts a new page (form feed or page banner).
#[must_use]
pub fn is_page_break(line: &str) -> bool {
    line.contains('\u{c}') || PAGE_BANNER_RE.is_match(line)
}

/// Whether `line` is an `=` separator, optionally broken by spaces.
#[must_use]
pub fn is_separator(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with("==") && trimmed.chars().all(|c| c == '=' || c.is_whitespace())
}

/// Whether `line` is pure separator art made of `=`, `-`, `+` and `|`.
#[must_use]
pub fn is_rule_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.chars().filter(|c| matches!(c, '=' | '-')).count() >= 2
        && trimmed
            .chars()
            .all(|c| matches!(c, '=' | '-' | '+' | '|') || c.is_whitespace())
}

/// Finds the table `table_id` and the bounds of its data body.
///
/// # Errors
///
/// * [`ExtractError::NotFound`] if no marker occurrence is followed by the
///   header rows of `header` and an `=` separator
/// * [`ExtractError::Configuration`] if `table_id` cannot form a marker
///   pattern
pub fn locate(
    doc: &ReportDocument,
    table_id: &str,
    header: &HeaderRule,
) -> Result<TableLocator, ExtractError> {
    let marker_re = marker_pattern(table_id)?;
    let lines = doc.lines();

    let mut saw_marker = false;
    for (marker_index, _) in lines
        .iter()
        .enumerate()
        .filter(|(_, line)| marker_re.is_match(line))
    {
        saw_marker = true;
        let search_end = lines
            .iter()
            .enumerate()
            .skip(marker_index + 1)
            .find(|(_, line)| is_table_marker(line))
            .map_or(lines.len(), |(i, _)| i);

        let Some((header_indices, separator_index)) =
            find_header(lines, marker_index + 1, search_end, header)
        else {
            log::debug!(
                "Table {table_id}: marker at line {marker_index} has no header before line {search_end}"
            );
            continue;
        };

        let data_start_index = separator_index + 1;
        let data_end_index = lines
            .iter()
            .enumerate()
            .skip(data_start_index)
            .find(|(_, line)| is_table_marker(line) || is_page_break(line))
            .map_or(lines.len(), |(i, _)| i);

        log::debug!(
            "Table {table_id}: marker={marker_index} headers={header_indices:?} \
             separator={separator_index} data={data_start_index}..{data_end_index}"
        );

        return Ok(TableLocator {
            table_id: table_id.to_owned(),
            marker_index,
            header_indices,
            separator_index,
            data_start_index,
            data_end_index,
        });
    }

    Err(ExtractError::NotFound {
        table_id: table_id.to_owned(),
        reason: if saw_marker {
            "header or separator not found".to_owned()
        } else {
            "marker not found".to_owned()
        },
    })
}

/// Returns the header row indices and the separator index, searching
/// `from..end`.
fn find_header(
    lines: &[String],
    from: usize,
    end: usize,
    rule: &HeaderRule,
) -> Option<(Vec<usize>, usize)> {
    let within = |start: usize| (start + 1)..(start + 1 + HEADER_REACH).min(end);
    let separator_after =
        |start: usize| within(start).find(|&k| is_separator(&lines[k]));

    for anchor in from..end {
        let line = &lines[anchor];
        if rule.group_row {
            if !YEAR_GROUP_RE.is_match(line) {
                continue;
            }
            match &rule.column_row {
                Some(column_rule) => {
                    for column in within(anchor) {
                        if column_rule.matches(&lines[column])
                            && let Some(sep) = separator_after(column)
                        {
                            return Some((vec![anchor, column], sep));
                        }
                    }
                }
                None => {
                    if let Some(sep) = separator_after(anchor) {
                        return Some((vec![anchor], sep));
                    }
                }
            }
        } else if let Some(column_rule) = &rule.column_row {
            if column_rule.matches(line)
                && let Some(sep) = separator_after(anchor)
            {
                return Some((vec![anchor], sep));
            }
        } else if is_separator(line) {
            return Some((Vec::new(), anchor));
        }
    }

    None
}
