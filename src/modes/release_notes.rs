//! Release-notes digest: one row per "what's new" page.

use indicatif::ProgressBar;
use scraper::Html;
use tracing::warn;
use url::Url;

use crate::constants::MAIN_DOC_URL;
use crate::error::{Result, ScrapeError};
use crate::locate::{element_text, find_tag, select_all};
use crate::output::ResultTable;
use crate::session::CachedSession;

const HEADER: [&str; 3] = ["Article link", "Title", "Editor, author"];

// First-level entries of the "what's new" table of contents.
const TOC_ENTRIES: &str = "#what-s-new-in-python div.toctree-wrapper li.toctree-l1";

pub async fn run(session: &CachedSession) -> anyhow::Result<ResultTable> {
    let whats_new_url = Url::parse(MAIN_DOC_URL)?.join("whatsnew/")?;
    let body = session.get_text(whats_new_url.as_str()).await?;
    let links = toc_links(&Html::parse_document(&body), &whats_new_url)?;

    let mut table = ResultTable::new(&HEADER);
    let pb = ProgressBar::new(links.len() as u64);
    for link in links {
        let body = match session.get_text(link.as_str()).await {
            Ok(body) => body,
            Err(err @ ScrapeError::FetchFailed { .. }) => {
                warn!("skipping {link}: {err}");
                pb.inc(1);
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        table.push(entry_row(&Html::parse_document(&body), &link)?);
        pb.inc(1);
    }
    pb.finish_and_clear();
    Ok(table)
}

/// Resolved link of every first-level TOC entry, in document order.
fn toc_links(doc: &Html, base: &Url) -> Result<Vec<Url>> {
    let mut links = Vec::new();
    for entry in select_all(doc.root_element(), TOC_ENTRIES)? {
        let anchor = find_tag(entry, "a")?;
        let href = anchor.value().attr("href").unwrap_or_default();
        let link = base.join(href).map_err(|_| ScrapeError::TagNotFound {
            query: format!("a[href={href:?}]"),
        })?;
        links.push(link);
    }
    Ok(links)
}

/// (link, top-level heading, first definition list) for one notes page.
fn entry_row(doc: &Html, link: &Url) -> Result<Vec<String>> {
    let title = element_text(find_tag(doc.root_element(), "h1")?);
    let credits = element_text(find_tag(doc.root_element(), "dl")?).replace('\n', " ");
    Ok(vec![link.to_string(), title, credits])
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = r#"
        <html><body><section id="what-s-new-in-python">
            <div class="toctree-wrapper">
                <ul>
                    <li class="toctree-l1"><a href="3.12.html">What's New In Python 3.12</a>
                        <ul><li class="toctree-l2"><a href="3.12.html#summary">Summary</a></li></ul>
                    </li>
                    <li class="toctree-l1"><a href="3.11.html">What's New In Python 3.11</a></li>
                </ul>
            </div>
        </section></body></html>
    "#;

    const ENTRY: &str = r#"
        <html><body>
            <h1>What's New In Python 3.12</h1>
            <dl><dt>Editor:</dt>
<dd>Some Editor</dd></dl>
        </body></html>
    "#;

    #[test]
    fn toc_entries_in_document_order() {
        let doc = Html::parse_document(INDEX);
        let base = Url::parse("https://docs.python.org/3/whatsnew/").unwrap();
        let links = toc_links(&doc, &base).unwrap();
        assert_eq!(
            links.iter().map(Url::as_str).collect::<Vec<_>>(),
            [
                "https://docs.python.org/3/whatsnew/3.12.html",
                "https://docs.python.org/3/whatsnew/3.11.html",
            ]
        );
    }

    #[test]
    fn unresolvable_href_is_a_structural_failure() {
        let page = r#"
            <html><body><section id="what-s-new-in-python">
                <div class="toctree-wrapper">
                    <ul><li class="toctree-l1"><a href="http://[bad/">broken</a></li></ul>
                </div>
            </section></body></html>
        "#;
        let doc = Html::parse_document(page);
        let base = Url::parse("https://docs.python.org/3/whatsnew/").unwrap();
        assert!(matches!(
            toc_links(&doc, &base),
            Err(ScrapeError::TagNotFound { .. })
        ));
    }

    #[test]
    fn entry_row_collapses_newlines() {
        let doc = Html::parse_document(ENTRY);
        let link = Url::parse("https://docs.python.org/3/whatsnew/3.12.html").unwrap();
        let row = entry_row(&doc, &link).unwrap();
        assert_eq!(row[0], "https://docs.python.org/3/whatsnew/3.12.html");
        assert_eq!(row[1], "What's New In Python 3.12");
        assert!(row[2].contains("Editor: Some Editor"));
        assert!(!row[2].contains('\n'));
    }

    #[test]
    fn extraction_is_deterministic() {
        let doc = Html::parse_document(ENTRY);
        let link = Url::parse("https://docs.python.org/3/whatsnew/3.12.html").unwrap();
        assert_eq!(entry_row(&doc, &link).unwrap(), entry_row(&doc, &link).unwrap());
    }

    #[test]
    fn missing_heading_is_fatal() {
        let doc = Html::parse_document("<html><body><p>bare</p></body></html>");
        let link = Url::parse("https://docs.python.org/3/whatsnew/3.12.html").unwrap();
        assert!(matches!(
            entry_row(&doc, &link),
            Err(ScrapeError::TagNotFound { .. })
        ));
    }
}
