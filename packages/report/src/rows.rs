//! Lazy collection of a table's raw data lines.

use stops_prn_report_models::{ReportDocument, TableLocator};

use crate::family::Terminator;
use crate::materialize::is_sentinel_line;
use crate::scanner::{is_page_break, is_rule_line, is_table_marker};

/// How the data body ends and where to look for the Total sentinel.
#[derive(Debug, Clone)]
pub struct RowRules {
    pub terminator: Terminator,
    /// Byte spans of the sentinel columns.
    pub sentinel_spans: Vec<(usize, usize)>,
}

/// Iterator over the data lines of one located table.
///
/// Skips blank lines and separator art. Stops at the next table marker,
/// a page banner, or the end of the data body; with
/// [`Terminator::TotalRow`] it also stops right after yielding the Total
/// sentinel line.
#[derive(Debug, Clone)]
pub struct RowCollector<'a> {
    lines: &'a [String],
    next: usize,
    end: usize,
    rules: RowRules,
    done: bool,
}

impl<'a> Iterator for RowCollector<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done && self.next < self.end {
            let line = self.lines[self.next].as_str();
            self.next += 1;

            if is_table_marker(line) || is_page_break(line) {
                self.done = true;
                break;
            }
            if line.trim().is_empty() || is_rule_line(line) {
                continue;
            }
            if self.rules.terminator == Terminator::TotalRow
                && is_sentinel_line(line, &self.rules.sentinel_spans)
            {
                self.done = true;
            }
            return Some(line);
        }
        None
    }
}

/// Starts a fresh collection from `locator`'s data start.
///
/// Each call returns an independent iterator, so collection can be
/// repeated from the same locator.
#[must_use]
pub fn collect_rows<'a>(
    doc: &'a ReportDocument,
    locator: &TableLocator,
    rules: RowRules,
) -> RowCollector<'a> {
    let lines = doc.lines();
    RowCollector {
        lines,
        next: locator.data_start_index,
        end: locator.data_end_index.min(lines.len()),
        rules,
        done: false,
    }
}
