//! Data-source abstraction for author profiles and publications.
//!
//! The upstream provider exposes exactly two operations: resolve an author
//! identifier into a full profile, and expand one publication stub into its
//! details. Keeping the seam this narrow lets tests substitute a scripted
//! fake without network access.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One row of the profile's publication table.
///
/// A stub is a partial record; a separate expansion call is required to
/// obtain full details.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublicationStub {
    /// Provider-side expansion key (`citation_for_view`)
    pub key: String,
    /// Title as shown in the table row
    pub title: String,
    /// Raw year text; may be missing or non-numeric
    pub year: Option<String>,
    /// Venue/citation line from the table row
    pub citation: Option<String>,
    /// Profile-relative link to the detail page
    pub detail_url: Option<String>,
}

/// Fully resolved author profile.
#[derive(Debug, Clone, Default)]
pub struct AuthorRecord {
    /// Aggregate citation count (all time)
    pub citations: i64,
    /// h-index (all time)
    pub h_index: i64,
    /// Publication stubs, in profile order
    pub publications: Vec<PublicationStub>,
}

/// Raw expanded publication record.
///
/// Every field is optional; the fallback chains in [`crate::stats`] turn
/// this into a presentable [`crate::stats::PublicationSummary`].
#[derive(Debug, Clone, Default)]
pub struct PublicationRecord {
    pub title: Option<String>,
    pub year: Option<String>,
    /// Human-readable citation string ("Journal of X 12 (3), 45-67, 2020")
    pub citation: Option<String>,
    pub num_citations: Option<i64>,
    pub abstract_text: Option<String>,
    /// Secondary abstract source, used when `abstract_text` is absent
    pub summary: Option<String>,
    /// Outbound landing-page URL
    pub pub_url: Option<String>,
    /// Direct e-print/PDF URL
    pub eprint_url: Option<String>,
    /// Absolute URL of the profile's own detail page, last-resort link
    pub author_pub_url: Option<String>,
    pub authors: Vec<String>,
}

/// Minimal interface to the upstream author/publication data source.
#[async_trait]
pub trait ScholarProvider {
    /// Resolve an author identifier into a full profile record.
    async fn resolve_author(&self, author_id: &str) -> Result<AuthorRecord>;

    /// Expand one publication stub into its full record.
    async fn expand_publication(&self, stub: &PublicationStub) -> Result<PublicationRecord>;
}
