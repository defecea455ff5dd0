//! The sequential fetch/expand/assemble pipeline.
//!
//! One author fetch, one expansion per selected publication, one document.
//! The author fetch is fatal on retry exhaustion; a single publication
//! failing its retries is logged and skipped so the rest of the run can
//! still be recorded.

use crate::error::Result;
use crate::provider::ScholarProvider;
use crate::retry::{retry, AUTHOR_BACKOFF, PUBLICATION_BACKOFF};
use crate::stats::{local_timestamp, normalize, select_recent, ScholarStats};
use std::time::Duration;
use tracing::{info, warn};

/// Pause between successive expansions, a courtesy to the upstream provider.
const EXPAND_DELAY: Duration = Duration::from_millis(600);

/// Pipeline knobs taken from the CLI.
#[derive(Debug, Clone)]
pub struct UpdateOptions {
    /// Maximum publications to expand; zero or negative disables truncation
    pub max: i64,
    /// Suppress per-publication progress lines
    pub quiet: bool,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            max: 120,
            quiet: false,
        }
    }
}

/// Run the full pipeline against `provider` and assemble the output
/// document.
pub async fn collect_stats<P: ScholarProvider>(
    provider: &P,
    author_id: &str,
    options: &UpdateOptions,
) -> Result<ScholarStats> {
    let author = retry(AUTHOR_BACKOFF, "author profile", || {
        provider.resolve_author(author_id)
    })
    .await?;

    let total = author.publications.len();
    info!(
        citations = author.citations,
        h_index = author.h_index,
        publications = total,
        "Fetched author profile"
    );

    let selected = select_recent(author.publications, options.max);
    let selected_count = selected.len();

    let mut recent = Vec::with_capacity(selected_count);
    for (i, stub) in selected.iter().enumerate() {
        match retry(PUBLICATION_BACKOFF, "publication expansion", || {
            provider.expand_publication(stub)
        })
        .await
        {
            Ok(record) => {
                let summary = normalize(record);
                if !options.quiet {
                    println!(
                        "- [{}] {} ({}) citations={}",
                        i + 1,
                        summary.title,
                        summary.year,
                        summary.citations_count
                    );
                }
                recent.push(summary);
                if i + 1 < selected_count {
                    tokio::time::sleep(EXPAND_DELAY).await;
                }
            }
            Err(e) => {
                warn!(title = %stub.title, error = %e, "Skipping publication after failed expansion");
            }
        }
    }

    Ok(ScholarStats {
        citations: author.citations,
        h_index: author.h_index,
        publications: total,
        last_updated: local_timestamp(),
        recent_publications: recent,
    })
}
