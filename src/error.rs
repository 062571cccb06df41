use thiserror::Error;

/// Failure taxonomy for a scraping run.
///
/// `FetchFailed` is the only variant loops are allowed to swallow (skip the
/// item, keep going). Everything else means the run cannot produce a
/// trustworthy result and must abort.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Transport-level failure reaching a page, including non-2xx responses.
    #[error("failed to load page {url}")]
    FetchFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// An expected structural element is absent from a fetched page. The
    /// remote layout no longer matches our assumptions, so further parsing
    /// of the same shape is pointless.
    #[error("tag not found: {query}")]
    TagNotFound { query: String },

    /// A PEP index status code missing from the expected-status table.
    /// Means the table is stale relative to the live site.
    #[error("unknown PEP status code {code:?} in row linking to {url}")]
    UnknownStatusCode { code: String, url: String },

    /// Response-cache storage failure.
    #[error("response cache error")]
    Cache(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
