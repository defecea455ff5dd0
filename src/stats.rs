//! Selection, normalization, and serialization of the stats document.
//!
//! Takes the raw records produced by a provider and turns them into the
//! JSON artifact the website reads.

use crate::error::Result;
use crate::provider::{PublicationRecord, PublicationStub};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::path::Path;
use tracing::info;

const DEFAULT_TITLE: &str = "N/A";
const DEFAULT_YEAR: &str = "Year Unknown";
const DEFAULT_CITATION: &str = "Citation not available";
const DEFAULT_ABSTRACT: &str = "Abstract not available";
const DEFAULT_URL: &str = "#";

/// One normalized publication entry in the output document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicationSummary {
    pub title: String,
    pub year: String,
    pub citation: String,
    pub citations_count: i64,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub url: String,
    pub authors: Vec<String>,
}

/// The persisted artifact. Overwrites any prior file at the output path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScholarStats {
    pub citations: i64,
    pub h_index: i64,
    /// Total stub count before truncation; may exceed the length of
    /// `recent_publications`.
    pub publications: usize,
    pub last_updated: String,
    pub recent_publications: Vec<PublicationSummary>,
}

/// Sort key for one stub: parsed publication year, 0 when missing or
/// non-numeric.
pub fn year_sort_key(stub: &PublicationStub) -> i64 {
    stub.year
        .as_deref()
        .and_then(|y| y.trim().parse::<i64>().ok())
        .unwrap_or(0)
}

/// Newest-first stable sort, then truncation to the first `max` entries.
/// `max <= 0` disables truncation.
pub fn select_recent(mut stubs: Vec<PublicationStub>, max: i64) -> Vec<PublicationStub> {
    stubs.sort_by_key(|s| Reverse(year_sort_key(s)));
    if max > 0 {
        stubs.truncate(max as usize);
    }
    stubs
}

/// Apply the documented fallback chains to a raw expanded record.
pub fn normalize(record: PublicationRecord) -> PublicationSummary {
    PublicationSummary {
        title: first_non_empty(vec![record.title], DEFAULT_TITLE),
        year: first_non_empty(vec![record.year], DEFAULT_YEAR),
        citation: first_non_empty(vec![record.citation], DEFAULT_CITATION),
        citations_count: record.num_citations.unwrap_or(0),
        abstract_text: first_non_empty(
            vec![record.abstract_text, record.summary],
            DEFAULT_ABSTRACT,
        ),
        url: first_non_empty(
            vec![record.pub_url, record.eprint_url, record.author_pub_url],
            DEFAULT_URL,
        ),
        authors: record.authors,
    }
}

fn first_non_empty(candidates: Vec<Option<String>>, default: &str) -> String {
    candidates
        .into_iter()
        .flatten()
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Local timestamp in the `YYYY-MM-DD HH:MM:SS` format the front-end expects.
pub fn local_timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Write the document as pretty-printed UTF-8 JSON, creating parent
/// directories as needed. The target is overwritten unconditionally.
pub fn write_stats(stats: &ScholarStats, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let content = serde_json::to_string_pretty(stats)?;
    std::fs::write(path, content)?;

    info!(path = %path.display(), "Wrote scholar stats");
    Ok(())
}
