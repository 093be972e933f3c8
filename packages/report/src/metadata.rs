//! Best-effort harvest of the run banner printed above a table marker.

use std::sync::LazyLock;

use regex::Regex;
use stops_prn_report_models::{MetadataBlock, ReportDocument};

/// Number of lines above the marker that are searched.
pub const LOOKBACK_LINES: usize = 9;

static PROGRAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Program\s+(.+?)\s+-\s+Version:").expect("valid regex"));

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Version:\s*(\S+)(?:\s*-\s*(\d{2}/\d{2}/\d{4}))?").expect("valid regex")
});

static RUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Run:\s*(.*?)(?:\s+System:\s*(.*?))?\s*$").expect("valid regex")
});

static PAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bPage\s+(\d+)").expect("valid regex"));

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_owned())
}

/// Collects `Program`, `Version`, `Run`, `System` and `Page` from the
/// [`LOOKBACK_LINES`] lines preceding `marker_index`.
///
/// Lines are scanned front to back, so the match closest to the marker
/// wins for each field. Lines matching nothing are ignored.
#[must_use]
pub fn harvest(doc: &ReportDocument, marker_index: usize) -> MetadataBlock {
    let end = marker_index.min(doc.len());
    let start = end.saturating_sub(LOOKBACK_LINES);
    let mut block = MetadataBlock::default();

    for line in &doc.lines()[start..end] {
        if let Some(caps) = PROGRAM_RE.captures(line)
            && let Some(program) = non_empty(&caps[1])
        {
            block.program = Some(program);
        }
        if let Some(caps) = VERSION_RE.captures(line) {
            let version = caps.get(2).map_or_else(
                || caps[1].to_owned(),
                |date| format!("{} - {}", &caps[1], date.as_str()),
            );
            block.version = Some(version);
        }

        let page = PAGE_RE.captures(line);
        if let Some(caps) = &page {
            block.page = Some(caps[1].to_owned());
        }

        // The page number often shares the run line.
        let run_line = page.as_ref().and_then(|c| c.get(0)).map_or_else(
            || line.clone(),
            |m| format!("{}{}", &line[..m.start()], &line[m.end()..]),
        );
        if let Some(caps) = RUN_RE.captures(&run_line) {
            if let Some(run) = non_empty(&caps[1]) {
                block.run = Some(run);
            }
            if let Some(system) = caps.get(2).and_then(|m| non_empty(m.as_str())) {
                block.system = Some(system);
            }
        }
    }

    block
}
