//! Version and status listing from the main index sidebar.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;

use crate::constants::MAIN_DOC_URL;
use crate::error::{Result, ScrapeError};
use crate::locate::{element_text, select_all};
use crate::output::ResultTable;
use crate::session::CachedSession;

const HEADER: [&str; 3] = ["Documentation link", "Version", "Status"];

const SIDEBAR_LISTS: &str = "div.sphinxsidebarwrapper ul";
const ALL_VERSIONS_MARKER: &str = "All versions";

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Python (?P<version>\d\.\d+) \((?P<status>.*)\)").unwrap());

pub async fn run(session: &CachedSession) -> anyhow::Result<ResultTable> {
    let body = session.get_text(MAIN_DOC_URL).await?;
    Ok(parse_versions(&Html::parse_document(&body))?)
}

/// One row per link of the sidebar list containing the "All versions"
/// marker. No marker means the page layout changed; that is fatal, there is
/// no fallback list to read.
fn parse_versions(doc: &Html) -> Result<ResultTable> {
    let list = select_all(doc.root_element(), SIDEBAR_LISTS)?
        .into_iter()
        .find(|ul| element_text(*ul).contains(ALL_VERSIONS_MARKER))
        .ok_or_else(|| ScrapeError::TagNotFound {
            query: format!("{SIDEBAR_LISTS}{{text~={ALL_VERSIONS_MARKER:?}}}"),
        })?;

    let mut table = ResultTable::new(&HEADER);
    for anchor in select_all(list, "a")? {
        let href = anchor.value().attr("href").unwrap_or_default().to_string();
        let text = element_text(anchor);
        let (version, status) = match VERSION_RE.captures(&text) {
            Some(caps) => (caps["version"].to_string(), caps["status"].to_string()),
            None => (text, String::new()),
        };
        table.push(vec![href, version, status]);
    }
    Ok(table)
}
