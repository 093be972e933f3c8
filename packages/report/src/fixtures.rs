//! Synthetic PRN reports laid out with exact fixed-width offsets.

use stops_prn_report_models::ReportDocument;

/// Sum of the interior cells of [`district_report`].
pub const DISTRICT_CELL_SUM: f64 = 37.0;

const BANNER: &str = "Program STOPS - Version: 2.52 - 03/15/2024\n\
                      Run: BASE2024 System: MBTA\n\
                      Page 12\n";

const NEXT_PAGE: &str = "Program STOPS - Version: 2.52 - 03/15/2024\n\
                         Run: BASE2024 System: MBTA\n\
                         Page 13\n";

fn group_row(start: usize, pitch: usize, groups: &[&str]) -> String {
    let mut line = " ".repeat(start);
    for group in groups {
        line.push_str(&format!("{group:<pitch$}"));
    }
    line.trim_end().to_owned()
}

fn cells(widths: &[usize], values: &[&str]) -> String {
    widths
        .iter()
        .cycle()
        .zip(values)
        .map(|(&w, v)| format!("{v:>w$}"))
        .collect()
}

fn route_row(id: &str, name: &str, count: &str, values: &[&str]) -> String {
    format!("{id:<20}{name:<36}{count:>9}{}", cells(&[10], values))
}

fn route_column_row(groups: usize) -> String {
    let modes = ["WLK", "KNR", "PNR", "ALL"].repeat(groups);
    route_row("Route_ID", "Route_Name", "Count", &modes)
}

fn stop_row(id: &str, name: &str, values: &[&str]) -> String {
    format!("{id:<26}{name:<21}{}", cells(&[11, 10, 10, 10, 10], values))
}

fn trip_row(hh: &str, sub: &str, access: &str, values: &[&str]) -> String {
    format!("{hh:<9}{sub:<20}{access:<13}|{}", cells(&[9], values))
}

fn matrix_row(origin: &str, values: &[&str]) -> String {
    format!("{origin:<10}{}", cells(&[8], values))
}

fn join(lines: &[String]) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Table 10.01 with two scenario groups, a Total row, and a following page.
pub fn route_report_text() -> String {
    let mut text = String::from(BANNER);
    text.push_str(&join(&[
        "Table 10.01 - Boardings by Route".to_owned(),
        String::new(),
        group_row(65, 40, &["Y2024 EXISTING", "Y2050 BUILD"]),
        String::new(),
        route_column_row(2),
        "=".repeat(145),
        route_row("R1", "Route One", "100", &["50", "50", "0", "100", "60", "60", "0", "120"]),
        "-".repeat(145),
        route_row("R2", "Route Two", "1,200", &["120", "80", "0", "200", "150", "90", "0", "240"]),
        String::new(),
        route_row("TOTAL", "", "1,300", &["170", "130", "0", "300", "210", "150", "0", "360"]),
        String::new(),
    ]));
    text.push_str(NEXT_PAGE);
    text.push_str("Table 10.02 - Boardings by Route Group\n");
    text
}

pub fn route_report() -> ReportDocument {
    ReportDocument::from_text(&route_report_text())
}

/// A one-group route table: `R1`, `R2` and a Total row with WLK and KNR.
pub fn scenario_report() -> ReportDocument {
    let mut text = String::from(BANNER);
    text.push_str(&join(&[
        "Table 10.01 - Boardings by Route".to_owned(),
        group_row(65, 40, &["Y2024 EXISTING"]),
        route_row("Route_ID", "Route_Name", "Count", &["WLK", "KNR"]),
        "=".repeat(85),
        route_row("R1", "Route One", "100", &["50", "50"]),
        route_row("R2", "Route Two", "200", &["120", "80"]),
        route_row("Total", "Total", "300", &["170", "130"]),
    ]));
    ReportDocument::from_text(&text)
}

/// A route table header with no data rows before the end of the file.
pub fn route_header_only() -> String {
    join(&[
        "Table 10.01 - Boardings by Route".to_owned(),
        group_row(65, 40, &["Y2024 EXISTING"]),
        route_column_row(1),
        "=".repeat(105),
        String::new(),
    ])
}

/// Table 9.01 with two scenario groups and a Total row.
pub fn stop_report() -> ReportDocument {
    let modes = ["WLK", "KNR", "PNR", "XFR", "ALL"].repeat(2);
    let mut text = String::from(BANNER);
    text.push_str(&join(&[
        "Table 9.01 - Boardings by Station".to_owned(),
        group_row(47, 51, &["Y2024 EXISTING", "Y2050 BUILD"]),
        stop_row("Stop_id1", "Station_Name", &modes),
        "=".repeat(149),
        stop_row(
            "70061",
            "Alewife",
            &["1,250", "300", "400", "10", "1,960", "1,400", "320", "450", "15", "2,185"],
        ),
        stop_row(
            "70063",
            "Davis",
            &["800", "50", "0", "5", "855", "900", "60", "0", "", "960"],
        ),
        stop_row(
            "Total",
            "",
            &["2,050", "350", "400", "15", "2,815", "2,300", "380", "450", "15", "3,145"],
        ),
    ]));
    ReportDocument::from_text(&text)
}

/// Table 10.02 with `--` route rows, indented segments and a Total row.
pub fn route_group_report() -> ReportDocument {
    let mut text = String::from(BANNER);
    text.push_str(&join(&[
        "Table 10.02 - Boardings by Route Group".to_owned(),
        group_row(65, 40, &["Y2024 EXISTING"]),
        route_row("Route_ID", "Group_Name", "Count", &["WLK", "KNR", "PNR", "ALL"]),
        "=".repeat(105),
        route_row("R1", "-- Red Line", "60", &["40", "20", "0", "60"]),
        route_row("", "  Segment A", "20", &["15", "5", "0", "20"]),
        route_row("", "  Segment B", "40", &["25", "15", "0", "40"]),
        route_row("R2", "-- Blue Line", "30", &["20", "10", "0", "30"]),
        route_row("", "  Segment C", "30", &["20", "10", "0", "30"]),
        route_row("Total", "", "90", &["60", "30", "0", "90"]),
        String::new(),
    ]));
    text.push_str(NEXT_PAGE);
    ReportDocument::from_text(&text)
}

/// Table 11.01 with blank `HH_Cars` / `Sub_mode` cells and a Total row.
pub fn trip_report() -> ReportDocument {
    let mut text = String::from(BANNER);
    text.push_str(&join(&[
        "Table 11.01 - Trips by Household Cars".to_owned(),
        String::new(),
        group_row(43, 18, &["Y2024 EXISTING", "Y2050 NO-BUILD", "Y2050 BUILD", "Y2050 BUILD-PROJECT"]),
        trip_row("HH_Cars", "Sub_mode", "Access_mode", &["Model", "Survey"].repeat(4)),
        "=".repeat(115),
        trip_row("0", "Bus", "WLK", &["1,200", "1,100", "1,300", "0", "1,350", "0", "50", "0"]),
        trip_row("", "", "KNR", &["300", "280", "310", "0", "320", "0", "10", "0"]),
        trip_row("", "Rail", "WLK", &["500", "450", "520", "0", "560", "0", "40", "0"]),
        trip_row("Total", "", "", &["2,000", "1,830", "2,130", "0", "2,230", "0", "100", "0"]),
    ]));
    ReportDocument::from_text(&text)
}

/// Table 11.01 where a Total row is followed by more data rows.
pub fn trip_report_rows_after_total() -> ReportDocument {
    let mut text = String::from(BANNER);
    text.push_str(&join(&[
        "Table 11.01 - Trips by Household Cars".to_owned(),
        String::new(),
        group_row(43, 18, &["Y2024 EXISTING", "Y2050 NO-BUILD", "Y2050 BUILD", "Y2050 BUILD-PROJECT"]),
        trip_row("HH_Cars", "Sub_mode", "Access_mode", &["Model", "Survey"].repeat(4)),
        "=".repeat(115),
        trip_row("0", "Bus", "WLK", &["10"; 8]),
        trip_row("", "", "KNR", &["20"; 8]),
        trip_row("Total", "Bus", "WLK", &["30"; 8]),
        trip_row("", "", "KNR", &["40"; 8]),
        trip_row("", "Rail", "WLK", &["50"; 8]),
    ]));
    ReportDocument::from_text(&text)
}

/// Table 11.01 whose data rows run onto a second page without a header.
///
/// With `form_feed` the second page starts with `\u{c}`; otherwise only
/// the page banner separates the two pages.
pub fn trip_report_across_pages(form_feed: bool) -> ReportDocument {
    let mut text = String::from(BANNER);
    text.push_str(&join(&[
        "Table 11.01 - Trips by Household Cars".to_owned(),
        String::new(),
        group_row(43, 18, &["Y2024 EXISTING", "Y2050 NO-BUILD", "Y2050 BUILD", "Y2050 BUILD-PROJECT"]),
        trip_row("HH_Cars", "Sub_mode", "Access_mode", &["Model", "Survey"].repeat(4)),
        "=".repeat(115),
        trip_row("0", "Bus", "WLK", &["10"; 8]),
        trip_row("", "", "KNR", &["20"; 8]),
    ]));
    if form_feed {
        text.push('\u{c}');
    }
    text.push_str(NEXT_PAGE);
    text.push_str(&join(&[
        trip_row("1", "Rail", "WLK", &["30"; 8]),
        trip_row("", "", "KNR", &["40"; 8]),
    ]));
    ReportDocument::from_text(&text)
}

/// A 3x3 district matrix with a summary column and a Total row.
pub fn district_report() -> ReportDocument {
    let mut text = String::from(BANNER);
    text.push_str(&join(&[
        "Table 5.01 - District to District Trips".to_owned(),
        String::new(),
        matrix_row("District", &["1", "2", "3", "Total"]),
        "=".repeat(42),
        matrix_row("1", &["5", "7", "2", "14"]),
        matrix_row("2", &["3", "4", "1", "8"]),
        matrix_row("3", &["0", "6", "9", "15"]),
        matrix_row("Total", &["8", "17", "12", "37"]),
    ]));
    ReportDocument::from_text(&text)
}
