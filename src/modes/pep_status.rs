//! PEP status tally, reconciled against the expected-status table.
//!
//! Rows are emitted sorted by status string, with a final `Total` row; this
//! order is part of the routine's contract.

use std::collections::BTreeMap;

use indicatif::{ProgressBar, ProgressStyle};
use scraper::Html;
use tracing::{info, warn};
use url::Url;

use crate::constants::{expected_statuses, PEPS_URL};
use crate::error::{Result, ScrapeError};
use crate::locate::{element_text, find_next_sibling_tag, find_tag, select_all, TagQuery};
use crate::output::ResultTable;
use crate::session::CachedSession;

const HEADER: [&str; 2] = ["Status", "Count"];
const TOTAL_LABEL: &str = "Total";

// Tables that make up the numerical PEP index.
const PEP_TABLES: &str = "table.pep-zero-table.docutils.align-default";

/// One data row of the PEP index: status code plus detail-page link.
struct IndexRow {
    code: String,
    url: Url,
}

/// Index-code vs detail-page disagreement. Logged for human review after the
/// scan; never aborts the run and never changes the count.
struct Mismatch {
    url: Url,
    actual: String,
    expected: &'static [&'static str],
}

pub async fn run(session: &CachedSession) -> anyhow::Result<ResultTable> {
    let base = Url::parse(PEPS_URL)?;
    let body = session.get_text(PEPS_URL).await?;
    let rows = index_rows(&Html::parse_document(&body), &base)?;

    let mut counter: BTreeMap<String, u64> = BTreeMap::new();
    let mut mismatches: Vec<Mismatch> = Vec::new();

    let pb = ProgressBar::new(rows.len() as u64).with_style(
        ProgressStyle::default_bar()
            .template("checking PEP statuses [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    for row in rows {
        let expected = lookup_expected(&row.code, &row.url)?;
        let body = match session.get_text(row.url.as_str()).await {
            Ok(body) => body,
            Err(err @ ScrapeError::FetchFailed { .. }) => {
                warn!("skipping {}: {err}", row.url);
                pb.inc(1);
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        let actual = page_status(&Html::parse_document(&body))?;
        if let Some(mismatch) = reconcile(&row.url, &actual, expected) {
            mismatches.push(mismatch);
        }
        *counter.entry(actual).or_insert(0) += 1;
        pb.inc(1);
    }
    pb.finish_and_clear();

    for m in &mismatches {
        info!(
            "mismatched statuses: {}\nstatus on page: {} expected statuses: {:?}",
            m.url, m.actual, m.expected
        );
    }
    Ok(tally(&counter))
}

/// Every non-header row of the PEP index tables: (status code, detail link).
/// The status code is the first cell's abbreviation minus its leading type
/// letter.
fn index_rows(doc: &Html, base: &Url) -> Result<Vec<IndexRow>> {
    let mut rows = Vec::new();
    for table in select_all(doc.root_element(), PEP_TABLES)? {
        for tr in select_all(table, "tr")? {
            if TagQuery::new("th").find_in(tr).is_ok() {
                continue; // header row
            }
            let href = find_tag(tr, "a")?.value().attr("href").unwrap_or_default();
            let url = base.join(href).map_err(|_| ScrapeError::TagNotFound {
                query: format!("a[href={href:?}]"),
            })?;
            let cell = element_text(find_tag(tr, "td")?);
            let code: String = cell.chars().skip(1).collect();
            rows.push(IndexRow { code, url });
        }
    }
    Ok(rows)
}

fn lookup_expected(code: &str, url: &Url) -> Result<&'static [&'static str]> {
    expected_statuses(code).ok_or_else(|| ScrapeError::UnknownStatusCode {
        code: code.to_string(),
        url: url.to_string(),
    })
}

/// Status spelled out on the PEP's own page: the `<dd>` paired with the
/// `Status:` definition term.
fn page_status(doc: &Html) -> Result<String> {
    let dt = TagQuery::new("dt")
        .text("Status:")
        .find_in(doc.root_element())?;
    Ok(element_text(find_next_sibling_tag(dt, "dd")?))
}

fn reconcile(url: &Url, actual: &str, expected: &'static [&'static str]) -> Option<Mismatch> {
    if expected.contains(&actual) {
        return None;
    }
    Some(Mismatch {
        url: url.clone(),
        actual: actual.to_string(),
        expected,
    })
}

/// Count table: one row per observed status (sorted), then the total.
fn tally(counter: &BTreeMap<String, u64>) -> ResultTable {
    let mut table = ResultTable::new(&HEADER);
    for (status, count) in counter {
        table.push(vec![status.clone(), count.to_string()]);
    }
    let total: u64 = counter.values().sum();
    table.push(vec![TOTAL_LABEL.to_string(), total.to_string()]);
    table
}
