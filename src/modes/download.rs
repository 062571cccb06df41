//! Reference-archive download. Writes a file instead of returning a table.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::Context;
use regex::Regex;
use scraper::Html;
use tracing::info;
use url::Url;

use crate::constants::{DOWNLOADS_DIR, MAIN_DOC_URL};
use crate::locate::{select_first, TagQuery};
use crate::session::CachedSession;

static PDF_A4_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r".+pdf-a4\.zip$").unwrap());

pub async fn run(session: &CachedSession) -> anyhow::Result<()> {
    let downloads_url = Url::parse(MAIN_DOC_URL)?.join("download.html")?;
    let body = session.get_text(downloads_url.as_str()).await?;
    let archive_url = archive_link(&Html::parse_document(&body), &downloads_url)?;
    let file_name = file_name_from(&archive_url);

    fs::create_dir_all(DOWNLOADS_DIR)
        .with_context(|| format!("failed to create download directory {DOWNLOADS_DIR}"))?;
    let archive_path = Path::new(DOWNLOADS_DIR).join(file_name);

    let bytes = session.get_bytes(archive_url.as_str()).await?;
    fs::write(&archive_path, bytes)
        .with_context(|| format!("failed to write {}", archive_path.display()))?;
    info!("archive downloaded and saved to {}", archive_path.display());
    Ok(())
}

/// Resolved URL of the A4 PDF archive in the downloads table.
///
/// The table is matched by class token, so extra classes on the live page
/// do not break the lookup.
fn archive_link(doc: &Html, base: &Url) -> anyhow::Result<Url> {
    let table = select_first(doc.root_element(), "table.docutils")?;
    let anchor = TagQuery::new("a")
        .attr_matches("href", &PDF_A4_RE)
        .find_in(table)?;
    let href = anchor.value().attr("href").unwrap_or_default();
    Ok(base.join(href)?)
}

/// Local file name: the final path segment of the archive URL.
fn file_name_from(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScrapeError;

    const PAGE: &str = r#"
        <html><body>
        <table class="docutils">
            <tr><td>HTML</td><td><a href="archives/python-3.12-docs-html.zip">zip</a></td></tr>
            <tr><td>PDF (A4)</td><td><a href="archives/python-3.12-docs-pdf-a4.zip">zip</a></td></tr>
            <tr><td>PDF (letter)</td><td><a href="archives/python-3.12-docs-pdf-letter.zip">zip</a></td></tr>
        </table>
        </body></html>
    "#;

    fn base() -> Url {
        Url::parse("https://docs.python.org/3/download.html").unwrap()
    }

    #[test]
    fn picks_the_a4_archive_link() {
        let url = archive_link(&Html::parse_document(PAGE), &base()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://docs.python.org/3/archives/python-3.12-docs-pdf-a4.zip"
        );
    }

    #[test]
    fn derives_file_name_from_last_segment() {
        let url = archive_link(&Html::parse_document(PAGE), &base()).unwrap();
        assert_eq!(file_name_from(&url), "python-3.12-docs-pdf-a4.zip");
    }

    #[test]
    fn table_with_extra_classes_still_matches() {
        let page = r#"<html><body><table class="docutils align-default">
            <tr><td><a href="archives/python-3.13-docs-pdf-a4.zip">zip</a></td></tr>
        </table></body></html>"#;
        let url = archive_link(&Html::parse_document(page), &base()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://docs.python.org/3/archives/python-3.13-docs-pdf-a4.zip"
        );
    }

    #[test]
    fn missing_table_is_fatal() {
        let doc = Html::parse_document("<html><body><p>no downloads</p></body></html>");
        let err = archive_link(&doc, &base()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScrapeError>(),
            Some(ScrapeError::TagNotFound { .. })
        ));
    }

    #[test]
    fn missing_archive_link_is_fatal() {
        let page = r#"<html><body><table class="docutils">
            <tr><td><a href="archives/python-3.12-docs-html.zip">zip</a></td></tr>
        </table></body></html>"#;
        let err = archive_link(&Html::parse_document(page), &base()).unwrap_err();
        assert!(err.to_string().contains("pdf-a4"));
    }
}
