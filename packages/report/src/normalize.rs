//! Hierarchical normalization of materialized tables.
//!
//! Reports print a two-level hierarchy through indentation: the group key
//! appears once and the rows beneath it leave the column blank. These
//! helpers restore the key on every row, turn `--` group rows into their
//! own column, and reshape origin-by-destination matrices into long form.

use stops_prn_report_models::{Cell, Column, ExtractedTable};

use crate::family::MatrixLayout;
use crate::materialize::is_total_label;

/// Group-row marker printed before a route's display name.
pub const GROUP_MARKER: &str = "--";

fn total_text(cell: &Cell) -> bool {
    cell.as_text().is_some_and(is_total_label)
}

/// Copies the nearest preceding non-blank value into blank cells of
/// `column`. Non-blank cells are never touched.
///
/// Returns the number of cells filled.
pub fn forward_fill(table: &mut ExtractedTable, column: &str) -> usize {
    let Some(idx) = table.column_index(column) else {
        return 0;
    };

    let mut last: Option<Cell> = None;
    let mut filled = 0;
    for row in table.rows_mut() {
        if row[idx].is_blank() {
            if let Some(value) = &last {
                row[idx] = value.clone();
                filled += 1;
            }
        } else {
            last = Some(row[idx].clone());
        }
    }
    filled
}

/// Indices of rows whose `sentinels` columns read `total` in any case.
///
/// Must be taken before any forward fill, which copies `Total` into the
/// blank cells of the rows that follow.
#[must_use]
pub fn total_rows(table: &ExtractedTable, sentinels: &[&str]) -> Vec<usize> {
    let sentinel_idx: Vec<usize> = sentinels
        .iter()
        .filter_map(|name| table.column_index(name))
        .collect();

    table
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| sentinel_idx.iter().any(|&i| total_text(&row[i])))
        .map(|(i, _)| i)
        .collect()
}

/// Rewrites every label column to `"Total"` on the given rows.
pub fn rewrite_total_rows(table: &mut ExtractedTable, rows: &[usize], labels: &[&str]) {
    let label_idx: Vec<usize> = labels
        .iter()
        .filter_map(|name| table.column_index(name))
        .collect();

    let table_rows = table.rows_mut();
    for &index in rows {
        if let Some(row) = table_rows.get_mut(index) {
            for &i in &label_idx {
                row[i] = Cell::text("Total");
            }
        }
    }
}

/// Normalizes a route table with indented segment groups.
///
/// * `Route_ID` is forward-filled.
/// * `Group_Name` cells starting with `--` move, without the marker, into a
///   new `Route_Name` column placed after `Route_ID`, and are cleared.
/// * `Route_Name` is forward-filled within each route.
/// * A `Group_Name` of `total` also marks the row's `Route_Name` as `Total`.
/// * Rows whose source `Route_ID` reads `total` are rewritten across every
///   label column. Rows that only inherit `Total` through the fill keep
///   their own labels.
pub fn regroup_routes(table: &mut ExtractedTable, labels: &[&str]) {
    let totals = total_rows(table, &["Route_ID"]);
    forward_fill(table, "Route_ID");

    let Some(group_idx) = table.column_index("Group_Name") else {
        return;
    };
    let route_idx = table.column_index("Route_ID").unwrap_or(0);

    let mut names = Vec::with_capacity(table.row_count());
    let mut group_totals = Vec::new();
    for (i, row) in table.rows_mut().iter_mut().enumerate() {
        let name = match row[group_idx].as_text() {
            Some(text) if text.starts_with(GROUP_MARKER) => {
                let name = text.trim_start_matches('-').trim().to_owned();
                row[group_idx] = Cell::text("");
                name
            }
            Some(text) if is_total_label(text) => {
                row[group_idx] = Cell::text("Total");
                group_totals.push(i);
                String::new()
            }
            _ => String::new(),
        };
        names.push(Cell::Text(name));
    }

    let name_idx = route_idx + 1;
    table.insert_column(name_idx, Column::label("Route_Name"), names);
    fill_within_groups(table, "Route_Name", "Route_ID");

    // A group-level total closes the route's segment list.
    let rows = table.rows_mut();
    for i in group_totals {
        rows[i][name_idx] = Cell::text("Total");
    }
    rewrite_total_rows(table, &totals, labels);
}

/// Forward-fills `column`, restarting whenever `key` changes.
fn fill_within_groups(table: &mut ExtractedTable, column: &str, key: &str) {
    let (Some(idx), Some(key_idx)) = (table.column_index(column), table.column_index(key)) else {
        return;
    };

    let mut last: Option<(Cell, Cell)> = None;
    for row in table.rows_mut() {
        let current_key = row[key_idx].clone();
        if row[idx].is_blank() {
            if let Some((last_key, value)) = &last
                && *last_key == current_key
            {
                row[idx] = value.clone();
            }
        } else {
            last = Some((current_key, row[idx].clone()));
        }
    }
}

/// Reshapes an origin-by-destination matrix into one row per cell.
///
/// Output columns are the origin, the destination key (taken from the
/// header) and the value. The summary row and the summary column are left
/// out, so the result holds `origins × destinations` rows.
#[must_use]
pub fn pivot_matrix(mut table: ExtractedTable, layout: &MatrixLayout) -> ExtractedTable {
    forward_fill(&mut table, layout.origin_column);

    let origin_idx = table.column_index(layout.origin_column).unwrap_or(0);
    let destinations: Vec<(usize, String)> = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(i, c)| *i != origin_idx && !c.name.eq_ignore_ascii_case(layout.summary_label))
        .map(|(i, c)| (i, c.name.clone()))
        .collect();

    let mut long = ExtractedTable::new(
        table.table_id.clone(),
        vec![
            Column::label(layout.origin_column),
            Column::label(layout.destination_column),
            Column::numeric(layout.value_column),
        ],
    );

    for row in table.rows() {
        let origin = &row[origin_idx];
        if total_text(origin) {
            continue;
        }
        for (i, destination) in &destinations {
            long.push_row(vec![
                origin.clone(),
                Cell::text(destination.as_str()),
                row[*i].clone(),
            ]);
        }
    }

    long
}
