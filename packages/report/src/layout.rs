//! Column layout resolution: dynamic header scans and catalog layouts.

use std::collections::BTreeSet;

use stops_prn_report_models::{CatalogEntry, ColumnSpec};

use crate::ExtractError;
use crate::family::{DynamicLayout, MatrixLayout};
use crate::materialize::slice_field;
use crate::scanner::YEAR_GROUP_RE;

fn config_error(table_id: &str, message: impl Into<String>) -> ExtractError {
    ExtractError::Configuration {
        table_id: table_id.to_owned(),
        message: message.into(),
    }
}

/// Scenario group names found in a group header row, in order.
///
/// `Y2024  EXISTING` becomes `Y2024_EXISTING`.
#[must_use]
pub fn scenario_groups(group_row: &str) -> Vec<String> {
    YEAR_GROUP_RE
        .find_iter(group_row)
        .map(|m| m.as_str().split_whitespace().collect::<Vec<_>>().join("_"))
        .collect()
}

/// Builds the prefix columns followed by one block of mode sub-columns
/// per scenario group, each block `layout.group_pitch()` wide.
///
/// # Errors
///
/// * [`ExtractError::Configuration`] if the group row names no scenario
pub fn resolve_dynamic(
    table_id: &str,
    group_row: &str,
    layout: &DynamicLayout,
) -> Result<ColumnSpec, ExtractError> {
    let groups = scenario_groups(group_row);
    if groups.is_empty() {
        return Err(config_error(table_id, "no scenario groups in header"));
    }

    let mut spec = ColumnSpec::from_widths(layout.prefix.iter().copied());
    let mut offset = layout.groups_start();
    for group in &groups {
        for (suffix, width) in layout.suffixes {
            spec.push(format!("{group}_{suffix}"), offset, offset + width);
            offset += width;
        }
    }

    log::debug!(
        "Table {table_id}: {} scenario group(s) {groups:?}, {} columns",
        groups.len(),
        spec.len()
    );
    Ok(spec)
}

/// Builds an origin column plus one destination column per header token
/// to the right of the origin column, at a constant pitch.
///
/// # Errors
///
/// * [`ExtractError::Configuration`] if the header names no destination
pub fn resolve_matrix(
    table_id: &str,
    column_row: &str,
    layout: &MatrixLayout,
) -> Result<ColumnSpec, ExtractError> {
    let mut spec = ColumnSpec::default();
    spec.push(layout.origin_column, 0, layout.origin_width);

    let tail = slice_field(column_row, layout.origin_width, usize::MAX);
    for (k, key) in tail.split_whitespace().enumerate() {
        let start = layout.origin_width + k * layout.pitch;
        spec.push(key, start, start + layout.pitch);
    }

    if spec.len() < 2 {
        return Err(config_error(table_id, "no destination keys in matrix header"));
    }
    Ok(spec)
}

/// Converts a catalog entry's `(name, width)` list to cumulative offsets.
///
/// # Errors
///
/// * [`ExtractError::Configuration`] if the entry lists no columns, or a
///   column has an empty name or zero width
pub fn from_catalog(entry: &CatalogEntry) -> Result<ColumnSpec, ExtractError> {
    if entry.columns.is_empty() {
        return Err(config_error(&entry.table_id, "catalog entry lists no columns"));
    }
    if let Some(bad) = entry
        .columns
        .iter()
        .find(|c| c.name.trim().is_empty() || c.width == 0)
    {
        return Err(config_error(
            &entry.table_id,
            format!("catalog column {:?} has width {}", bad.name, bad.width),
        ));
    }

    Ok(ColumnSpec::from_widths(
        entry.columns.iter().map(|c| (c.name.as_str(), c.width)),
    ))
}

/// Checks that a resolved layout is usable: names are unique, every range
/// is non-empty, and every `required` column is present.
///
/// # Errors
///
/// * [`ExtractError::Configuration`] describing the first problem found
pub fn validate(table_id: &str, spec: &ColumnSpec, required: &[&str]) -> Result<(), ExtractError> {
    let mut seen = BTreeSet::new();
    for column in spec.columns() {
        if !seen.insert(column.name.as_str()) {
            return Err(config_error(
                table_id,
                format!("duplicate column {:?}", column.name),
            ));
        }
        if column.start >= column.end {
            return Err(config_error(
                table_id,
                format!("column {:?} has an empty range", column.name),
            ));
        }
    }

    if let Some(missing) = required.iter().find(|name| spec.get(name).is_none()) {
        return Err(config_error(
            table_id,
            format!("layout is missing column {missing:?}"),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::{LayoutRule, profile};
    use stops_prn_report_models::{CatalogColumn, TableFamily};

    fn dynamic(family: TableFamily) -> &'static DynamicLayout {
        match profile(family).layout {
            LayoutRule::Dynamic(layout) => layout,
            LayoutRule::Matrix(_) | LayoutRule::Catalog => unreachable!(),
        }
    }

    #[test]
    fn dynamic_route_columns_follow_groups() {
        let spec = resolve_dynamic(
            "10.01",
            "                                                                 Y2024  EXISTING                         Y2050 NO-BUILD",
            dynamic(TableFamily::RouteBoardings),
        )
        .unwrap();

        let names: Vec<&str> = spec.names().collect();
        assert_eq!(
            names,
            vec![
                "Route_ID",
                "Route_Name",
                "Count",
                "Y2024_EXISTING_WLK",
                "Y2024_EXISTING_KNR",
                "Y2024_EXISTING_PNR",
                "Y2024_EXISTING_ALL",
                "Y2050_NO-BUILD_WLK",
                "Y2050_NO-BUILD_KNR",
                "Y2050_NO-BUILD_PNR",
                "Y2050_NO-BUILD_ALL",
            ]
        );
        let second = spec.get("Y2050_NO-BUILD_WLK").unwrap();
        assert_eq!((second.start, second.end), (105, 115));
    }

    #[test]
    fn dynamic_stop_columns_use_wide_walk() {
        let spec = resolve_dynamic(
            "9.01",
            "Y2024 EXISTING",
            dynamic(TableFamily::StopBoardings),
        )
        .unwrap();
        let wlk = spec.get("Y2024_EXISTING_WLK").unwrap();
        let knr = spec.get("Y2024_EXISTING_KNR").unwrap();
        assert_eq!((wlk.start, wlk.end), (47, 58));
        assert_eq!((knr.start, knr.end), (58, 68));
    }

    #[test]
    fn group_row_without_scenarios_is_configuration_error() {
        let err = resolve_dynamic("10.01", "Boardings", dynamic(TableFamily::RouteBoardings))
            .unwrap_err();
        assert!(matches!(err, ExtractError::Configuration { .. }));
    }

    #[test]
    fn matrix_destinations_come_from_header() {
        let header = format!("{:<10}{:>8}{:>8}{:>8}", "District", "1", "2", "Total");
        let layout = match profile(TableFamily::DistrictMatrix).layout {
            LayoutRule::Matrix(layout) => layout,
            LayoutRule::Dynamic(_) | LayoutRule::Catalog => unreachable!(),
        };
        let spec = resolve_matrix("5.01", &header, layout).unwrap();

        assert_eq!(
            spec.names().collect::<Vec<_>>(),
            vec!["Origin_District", "1", "2", "Total"]
        );
        let two = spec.get("2").unwrap();
        assert_eq!((two.start, two.end), (18, 26));
    }

    #[test]
    fn catalog_widths_become_offsets() {
        let entry = CatalogEntry {
            table_id: "11.01".to_owned(),
            format_type: "fixed_width".to_owned(),
            columns: vec![
                CatalogColumn { name: "HH_Cars".to_owned(), width: 9 },
                CatalogColumn { name: "Sub_mode".to_owned(), width: 20 },
            ],
            extraction_function: None,
        };
        let spec = from_catalog(&entry).unwrap();
        let sub = spec.get("Sub_mode").unwrap();
        assert_eq!((sub.start, sub.end), (9, 29));
    }

    #[test]
    fn incomplete_catalog_entry_is_rejected() {
        let mut entry = CatalogEntry {
            table_id: "11.01".to_owned(),
            format_type: "fixed_width".to_owned(),
            columns: Vec::new(),
            extraction_function: None,
        };
        assert!(from_catalog(&entry).is_err());

        entry.columns.push(CatalogColumn { name: "HH_Cars".to_owned(), width: 0 });
        assert!(from_catalog(&entry).is_err());
    }

    #[test]
    fn validate_catches_duplicates_and_missing_columns() {
        let spec = ColumnSpec::from_widths([("a", 3), ("a", 3)]);
        assert!(validate("1.01", &spec, &[]).is_err());

        let spec = ColumnSpec::from_widths([("a", 3), ("b", 3)]);
        assert!(validate("1.01", &spec, &["a"]).is_ok());
        assert!(validate("1.01", &spec, &["c"]).is_err());
    }
}
