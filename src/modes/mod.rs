//! The four extraction routines and their dispatch.

pub mod download;
pub mod latest_versions;
pub mod pep_status;
pub mod release_notes;

use clap::ValueEnum;

use crate::output::ResultTable;
use crate::session::CachedSession;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Mode {
    /// "What's new" digest, one row per release notes page
    ReleaseNotes,
    /// Version and status listing from the main index sidebar
    LatestVersions,
    /// Download the PDF reference archive
    Download,
    /// PEP status tally, reconciled against the expected-status table
    PepStatus,
}

impl Mode {
    /// Stable name used for CSV file naming.
    pub fn name(self) -> &'static str {
        match self {
            Mode::ReleaseNotes => "release-notes",
            Mode::LatestVersions => "latest-versions",
            Mode::Download => "download",
            Mode::PepStatus => "pep-status",
        }
    }
}

/// Run one routine. The download routine produces a file, not a table.
pub async fn run(mode: Mode, session: &CachedSession) -> anyhow::Result<Option<ResultTable>> {
    match mode {
        Mode::ReleaseNotes => release_notes::run(session).await.map(Some),
        Mode::LatestVersions => latest_versions::run(session).await.map(Some),
        Mode::Download => download::run(session).await.map(|_| None),
        Mode::PepStatus => pep_status::run(session).await.map(Some),
    }
}
