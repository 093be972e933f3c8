//! Constant extraction profiles for each [`TableFamily`].
//!
//! A profile fixes everything about a family that is not read from the
//! report itself: which header rows anchor the table, how its columns are
//! laid out, how the data body ends, which columns stay text, and which
//! normalization steps run afterwards. Pitches and widths live here as
//! data so that upstream formatting drift is a one-line change.

use stops_prn_report_models::TableFamily;

/// Access-mode tokens that identify a boardings column row.
pub const MODE_TOKENS: &[&str] = &["WLK", "KNR", "PNR", "XFR", "ALL"];

/// A token requirement on one header line.
///
/// The line is split on whitespace and `|`; every token in `all_of` must
/// appear, and when `any_of` is non-empty at least one of its tokens must
/// appear too.
#[derive(Debug, Clone, Copy)]
pub struct TokenRule {
    /// Tokens that must all appear.
    pub all_of: &'static [&'static str],
    /// Tokens of which at least one must appear; ignored when empty.
    pub any_of: &'static [&'static str],
}

impl TokenRule {
    #[must_use]
    pub fn matches(&self, line: &str) -> bool {
        let tokens: Vec<&str> = line
            .split(|c: char| c.is_whitespace() || c == '|')
            .filter(|t| !t.is_empty())
            .collect();
        self.all_of.iter().all(|t| tokens.contains(t))
            && (self.any_of.is_empty() || self.any_of.iter().any(|t| tokens.contains(t)))
    }
}

/// Which header rows must precede the `=` separator.
#[derive(Debug, Clone, Copy)]
pub struct HeaderRule {
    /// Whether a scenario group row (`Y2024 EXISTING ...`) comes first.
    pub group_row: bool,
    /// Token rule for the column-name row, if the family has one.
    pub column_row: Option<TokenRule>,
}

/// A fixed prefix followed by repeated scenario groups of mode columns.
#[derive(Debug, Clone, Copy)]
pub struct DynamicLayout {
    /// `(name, width)` columns at the start of every row.
    pub prefix: &'static [(&'static str, usize)],
    /// `(suffix, width)` sub-columns seeded for every scenario group.
    pub suffixes: &'static [(&'static str, usize)],
}

impl DynamicLayout {
    /// Offset of the first scenario group.
    #[must_use]
    pub fn groups_start(&self) -> usize {
        self.prefix.iter().map(|(_, w)| w).sum()
    }

    /// Width of one scenario group.
    #[must_use]
    pub fn group_pitch(&self) -> usize {
        self.suffixes.iter().map(|(_, w)| w).sum()
    }
}

/// An origin column followed by one destination column per header token.
#[derive(Debug, Clone, Copy)]
pub struct MatrixLayout {
    /// Name of the leading origin column.
    pub origin_column: &'static str,
    /// Width of the origin column.
    pub origin_width: usize,
    /// Width of every destination column.
    pub pitch: usize,
    /// Name of the destination key column in long form.
    pub destination_column: &'static str,
    /// Name of the value column in long form.
    pub value_column: &'static str,
    /// Header token of the row-sum column, excluded from the pivot.
    pub summary_label: &'static str,
}

/// Where a family's column layout comes from by default.
#[derive(Debug, Clone, Copy)]
pub enum LayoutRule {
    /// Prefix columns plus scenario groups read from the header.
    Dynamic(&'static DynamicLayout),
    /// Destination columns read from the column-name row.
    Matrix(&'static MatrixLayout),
    /// Only a `fixed_width` catalog entry can describe the columns.
    Catalog,
}

/// How the data body of a table ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    /// The Total sentinel row is kept and ends the table.
    TotalRow,
    /// Only the next table marker, a page banner, or EOF ends the table.
    Structural,
}

/// Post-materialization reshaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalization {
    /// The materialized table is final.
    None,
    /// Forward-fill the listed columns, in order.
    ForwardFill(&'static [&'static str]),
    /// Split `--` group rows into a `Route_Name` column.
    RouteGroups,
    /// Reshape the wide matrix into long form.
    MatrixPivot,
}

/// The full constant profile of one family.
#[derive(Debug, Clone, Copy)]
pub struct FamilyProfile {
    /// Header rows that anchor the table.
    pub header: HeaderRule,
    /// Default column layout.
    pub layout: LayoutRule,
    /// How the data body ends.
    pub terminator: Terminator,
    /// Columns kept as text instead of coerced to numbers.
    pub label_columns: &'static [&'static str],
    /// Columns inspected for the `Total` sentinel.
    pub sentinel_columns: &'static [&'static str],
    /// Columns the resolved layout must provide.
    pub required_columns: &'static [&'static str],
    /// Reshaping applied after materialization.
    pub normalization: Normalization,
}

const ROUTE_MODES: &[(&str, usize)] = &[("WLK", 10), ("KNR", 10), ("PNR", 10), ("ALL", 10)];

const STOP_MODES: &[(&str, usize)] = &[
    ("WLK", 11),
    ("KNR", 10),
    ("PNR", 10),
    ("XFR", 10),
    ("ALL", 10),
];

static ROUTE_LAYOUT: DynamicLayout = DynamicLayout {
    prefix: &[("Route_ID", 20), ("Route_Name", 36), ("Count", 9)],
    suffixes: ROUTE_MODES,
};

static STOP_LAYOUT: DynamicLayout = DynamicLayout {
    prefix: &[("Stop_id1", 26), ("Station_Name", 21)],
    suffixes: STOP_MODES,
};

static ROUTE_GROUP_LAYOUT: DynamicLayout = DynamicLayout {
    prefix: &[("Route_ID", 20), ("Group_Name", 36), ("Count", 9)],
    suffixes: ROUTE_MODES,
};

static DISTRICT_LAYOUT: MatrixLayout = MatrixLayout {
    origin_column: "Origin_District",
    origin_width: 10,
    pitch: 8,
    destination_column: "Destination_District",
    value_column: "Trips",
    summary_label: "Total",
};

static ROUTE_BOARDINGS: FamilyProfile = FamilyProfile {
    header: HeaderRule {
        group_row: true,
        column_row: Some(TokenRule {
            all_of: &["Route_ID"],
            any_of: MODE_TOKENS,
        }),
    },
    layout: LayoutRule::Dynamic(&ROUTE_LAYOUT),
    terminator: Terminator::TotalRow,
    label_columns: &["Route_ID", "Route_Name"],
    sentinel_columns: &["Route_ID", "Route_Name"],
    required_columns: &["Route_ID", "Route_Name"],
    normalization: Normalization::None,
};

static STOP_BOARDINGS: FamilyProfile = FamilyProfile {
    header: HeaderRule {
        group_row: true,
        column_row: Some(TokenRule {
            all_of: &["Stop_id1"],
            any_of: MODE_TOKENS,
        }),
    },
    layout: LayoutRule::Dynamic(&STOP_LAYOUT),
    terminator: Terminator::TotalRow,
    label_columns: &["Stop_id1", "Station_Name"],
    sentinel_columns: &["Stop_id1", "Station_Name"],
    required_columns: &["Stop_id1", "Station_Name"],
    normalization: Normalization::None,
};

static ROUTE_GROUP_BOARDINGS: FamilyProfile = FamilyProfile {
    header: HeaderRule {
        group_row: true,
        column_row: Some(TokenRule {
            all_of: &["Route_ID", "Count"],
            any_of: MODE_TOKENS,
        }),
    },
    layout: LayoutRule::Dynamic(&ROUTE_GROUP_LAYOUT),
    terminator: Terminator::Structural,
    label_columns: &["Route_ID", "Route_Name", "Group_Name"],
    sentinel_columns: &["Route_ID"],
    required_columns: &["Route_ID", "Group_Name"],
    normalization: Normalization::RouteGroups,
};

static TRIP_CHARACTERISTICS: FamilyProfile = FamilyProfile {
    header: HeaderRule {
        group_row: true,
        column_row: None,
    },
    layout: LayoutRule::Catalog,
    terminator: Terminator::Structural,
    label_columns: &["HH_Cars", "Sub_mode", "Access_mode"],
    sentinel_columns: &["HH_Cars"],
    required_columns: &["HH_Cars", "Sub_mode", "Access_mode"],
    normalization: Normalization::ForwardFill(&["HH_Cars", "Sub_mode"]),
};

static DISTRICT_MATRIX: FamilyProfile = FamilyProfile {
    header: HeaderRule {
        group_row: false,
        column_row: Some(TokenRule {
            all_of: &["District"],
            any_of: &[],
        }),
    },
    layout: LayoutRule::Matrix(&DISTRICT_LAYOUT),
    terminator: Terminator::TotalRow,
    label_columns: &["Origin_District"],
    sentinel_columns: &["Origin_District"],
    required_columns: &["Origin_District"],
    normalization: Normalization::MatrixPivot,
};

/// The constant profile for `family`.
#[must_use]
pub const fn profile(family: TableFamily) -> &'static FamilyProfile {
    match family {
        TableFamily::RouteBoardings => &ROUTE_BOARDINGS,
        TableFamily::StopBoardings => &STOP_BOARDINGS,
        TableFamily::RouteGroupBoardings => &ROUTE_GROUP_BOARDINGS,
        TableFamily::TripCharacteristics => &TRIP_CHARACTERISTICS,
        TableFamily::DistrictMatrix => &DISTRICT_MATRIX,
    }
}
