//! Entry URLs, local directories and the expected-status table.

pub const MAIN_DOC_URL: &str = "https://docs.python.org/3/";
pub const PEPS_URL: &str = "https://peps.python.org/";

pub const CACHE_DB_PATH: &str = "cache/responses.sqlite";
pub const DOWNLOADS_DIR: &str = "downloads";
pub const RESULTS_DIR: &str = "results";

/// Acceptable detail-page status strings for a PEP index status code.
///
/// The index shows a one-letter code (second letter of the `<abbr>` cell);
/// the PEP's own page spells the status out. Loaded nowhere, mutated never:
/// a static match is the whole table.
pub fn expected_statuses(code: &str) -> Option<&'static [&'static str]> {
    Some(match code {
        "A" => &["Active", "Accepted"],
        "D" => &["Deferred"],
        "F" => &["Final"],
        "P" => &["Provisional"],
        "R" => &["Rejected"],
        "S" => &["Superseded"],
        "W" => &["Withdrawn"],
        // An empty code on the index means the PEP is still in flight.
        "" => &["Draft", "Active"],
        _ => return None,
    })
}
