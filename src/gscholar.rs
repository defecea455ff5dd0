//! Google Scholar profile scraping provider.
//!
//! Implements [`ScholarProvider`] against the public citations profile
//! pages. Two page types are parsed:
//!
//! - the profile page (`citations?user=...`) for the statistics table and
//!   the publication rows, paged with `cstart`/`pagesize`
//! - the per-publication detail page (`citations?view_op=view_citation`)
//!   for authors, date, description, and citation count

use crate::error::{OptionExt, Result, ScholarError};
use crate::provider::{AuthorRecord, PublicationRecord, PublicationStub, ScholarProvider};
use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Default Google Scholar URL
pub const DEFAULT_SCHOLAR_URL: &str = "https://scholar.google.com";

/// User agent string for requests
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Publications requested per profile page (Scholar's maximum page size)
const PAGE_SIZE: usize = 100;

/// HTTP client for Google Scholar profile pages
pub struct GoogleScholarClient {
    client: reqwest::Client,
    base_url: String,
}

impl GoogleScholarClient {
    /// Create a client against the default Scholar URL
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_SCHOLAR_URL)
    }

    /// Create a client against a custom base URL (mirror sites, tests)
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .cookie_store(true)
            .build()
            .map_err(|e| ScholarError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build the profile page URL for one slice of the publication table
    fn profile_url(&self, author_id: &str, cstart: usize) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/citations", self.base_url))
            .map_err(|e| ScholarError::Config(format!("Invalid base URL: {}", e)))?;
        {
            let mut params = url.query_pairs_mut();
            params.append_pair("user", author_id);
            params.append_pair("hl", "en");
            params.append_pair("cstart", &cstart.to_string());
            params.append_pair("pagesize", &PAGE_SIZE.to_string());
        }
        Ok(url)
    }

    /// Fetch a page, mapping throttling and CAPTCHA interstitials to errors
    async fn fetch_page(&self, url: &Url) -> Result<String> {
        let response = self
            .client
            .get(url.as_str())
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ScholarError::RateLimited(60));
        }
        if !status.is_success() {
            return Err(ScholarError::Api {
                code: status.as_u16() as i32,
                message: format!("HTTP error: {}", status),
            });
        }

        let html = response.text().await?;
        if html.contains("Solving the above CAPTCHA") || html.contains("unusual traffic") {
            return Err(ScholarError::Captcha);
        }

        Ok(html)
    }
}

#[async_trait]
impl ScholarProvider for GoogleScholarClient {
    async fn resolve_author(&self, author_id: &str) -> Result<AuthorRecord> {
        info!("Resolving author profile");

        let url = self.profile_url(author_id, 0)?;
        let html = self.fetch_page(&url).await?;

        let (citations, h_index) = parse_profile_stats(&html)?;
        let mut publications = parse_publication_rows(&html)?;

        // Page through the rest of the table. A short page means we are done.
        let mut last_count = publications.len();
        let mut cstart = PAGE_SIZE;
        while last_count == PAGE_SIZE {
            let url = self.profile_url(author_id, cstart)?;
            let html = self.fetch_page(&url).await?;
            let page = parse_publication_rows(&html)?;
            debug!(cstart, count = page.len(), "Fetched profile page");
            last_count = page.len();
            cstart += PAGE_SIZE;
            publications.extend(page);
        }

        info!(
            citations,
            h_index,
            publications = publications.len(),
            "Author profile resolved"
        );

        Ok(AuthorRecord {
            citations,
            h_index,
            publications,
        })
    }

    async fn expand_publication(&self, stub: &PublicationStub) -> Result<PublicationRecord> {
        let href = stub
            .detail_url
            .as_deref()
            .ok_or_parse("publication stub has no detail link")?;
        let base = Url::parse(&self.base_url)
            .map_err(|e| ScholarError::Config(format!("Invalid base URL: {}", e)))?;
        let url = base
            .join(href)
            .map_err(|e| ScholarError::Parse(format!("Invalid detail link '{}': {}", href, e)))?;

        debug!(key = %stub.key, "Expanding publication");
        let html = self.fetch_page(&url).await?;
        let mut record = parse_publication_detail(&html)?;

        // Fields only present on the profile row survive expansion.
        if record.year.is_none() {
            record.year = stub.year.clone();
        }
        if record.citation.is_none() {
            record.citation = stub.citation.clone();
        }
        record.author_pub_url = Some(url.to_string());

        Ok(record)
    }
}

/// Parse the profile statistics table into (citations, h-index), all-time
/// columns.
///
/// # Errors
///
/// Returns a parse error when the table is missing, which also covers
/// profiles that do not exist.
pub fn parse_profile_stats(html: &str) -> Result<(i64, i64)> {
    let document = Html::parse_document(html);
    let cell_selector =
        Selector::parse("td.gsc_rsb_std").map_err(|e| ScholarError::Parse(e.to_string()))?;

    let cells: Vec<i64> = document
        .select(&cell_selector)
        .map(|cell| {
            cell.text()
                .collect::<String>()
                .trim()
                .replace(',', "")
                .parse::<i64>()
                .unwrap_or(0)
        })
        .collect();

    // Table layout: citations (all, 5y), h-index (all, 5y), i10-index (all, 5y).
    if cells.len() < 3 {
        return Err(ScholarError::Parse(
            "profile statistics table not found".to_string(),
        ));
    }

    Ok((cells[0], cells[2]))
}

/// Parse one slice of the profile's publication table into stubs.
pub fn parse_publication_rows(html: &str) -> Result<Vec<PublicationStub>> {
    let document = Html::parse_document(html);

    let row_selector =
        Selector::parse("tr.gsc_a_tr").map_err(|e| ScholarError::Parse(e.to_string()))?;
    let title_selector =
        Selector::parse("td.gsc_a_t a.gsc_a_at").map_err(|e| ScholarError::Parse(e.to_string()))?;
    let gray_selector =
        Selector::parse("td.gsc_a_t div.gs_gray").map_err(|e| ScholarError::Parse(e.to_string()))?;
    let year_selector =
        Selector::parse("td.gsc_a_y span").map_err(|e| ScholarError::Parse(e.to_string()))?;

    let mut stubs = Vec::new();

    for row in document.select(&row_selector) {
        // Rows without a title link include the "no articles" placeholder.
        let Some(title_elem) = row.select(&title_selector).next() else {
            continue;
        };
        let title = title_elem.text().collect::<String>().trim().to_string();
        if title.is_empty() {
            continue;
        }

        let detail_url = title_elem.value().attr("href").map(str::to_string);
        let key = detail_url
            .as_deref()
            .and_then(extract_citation_key)
            .unwrap_or_default();

        // Two gray lines under the title: authors, then the venue/citation.
        let grays: Vec<String> = row
            .select(&gray_selector)
            .map(|g| g.text().collect::<String>().trim().to_string())
            .collect();
        let citation = grays.get(1).filter(|s| !s.is_empty()).cloned();

        let year = row
            .select(&year_selector)
            .next()
            .map(|y| y.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty());

        stubs.push(PublicationStub {
            key,
            title,
            year,
            citation,
            detail_url,
        });
    }

    Ok(stubs)
}

/// Parse a publication detail page into a raw record.
pub fn parse_publication_detail(html: &str) -> Result<PublicationRecord> {
    let document = Html::parse_document(html);

    let title_selector =
        Selector::parse("#gsc_oci_title").map_err(|e| ScholarError::Parse(e.to_string()))?;
    let title_link_selector =
        Selector::parse("a.gsc_oci_title_link").map_err(|e| ScholarError::Parse(e.to_string()))?;
    let eprint_selector =
        Selector::parse("#gsc_oci_title_gg a").map_err(|e| ScholarError::Parse(e.to_string()))?;
    let field_selector = Selector::parse("#gsc_oci_table div.gs_scl")
        .map_err(|e| ScholarError::Parse(e.to_string()))?;
    let label_selector =
        Selector::parse("div.gsc_oci_field").map_err(|e| ScholarError::Parse(e.to_string()))?;
    let value_selector =
        Selector::parse("div.gsc_oci_value").map_err(|e| ScholarError::Parse(e.to_string()))?;

    let cited_regex =
        Regex::new(r"Cited by\s*(\d+)").map_err(|e| ScholarError::Parse(e.to_string()))?;

    let mut record = PublicationRecord::default();

    if let Some(title_elem) = document.select(&title_selector).next() {
        let text = title_elem.text().collect::<String>().trim().to_string();
        if !text.is_empty() {
            record.title = Some(text);
        }
    }
    if let Some(link) = document.select(&title_link_selector).next() {
        record.pub_url = link.value().attr("href").map(str::to_string);
    }
    // "[PDF] from ..." sidebar box, when present
    if let Some(link) = document.select(&eprint_selector).next() {
        record.eprint_url = link.value().attr("href").map(str::to_string);
    }

    for field in document.select(&field_selector) {
        let Some(label) = field.select(&label_selector).next() else {
            continue;
        };
        let Some(value) = field.select(&value_selector).next() else {
            continue;
        };
        let label_text = label.text().collect::<String>().trim().to_lowercase();
        let value_text = value.text().collect::<String>().trim().to_string();
        if value_text.is_empty() {
            continue;
        }

        match label_text.as_str() {
            "authors" | "inventors" => {
                record.authors = value_text
                    .split(',')
                    .map(|a| a.trim().to_string())
                    .filter(|a| !a.is_empty())
                    .collect();
            }
            // "2021/3/15" or just "2021"
            "publication date" => {
                record.year = value_text
                    .split('/')
                    .next()
                    .map(|y| y.trim().to_string())
                    .filter(|y| !y.is_empty());
            }
            "description" => {
                record.abstract_text = Some(value_text);
            }
            "total citations" => {
                record.num_citations = cited_regex
                    .captures(&value_text)
                    .and_then(|caps| caps.get(1))
                    .and_then(|m| m.as_str().parse::<i64>().ok());
            }
            _ => {}
        }
    }

    Ok(record)
}

/// Extract the `citation_for_view` key from a detail href
fn extract_citation_key(href: &str) -> Option<String> {
    href.split('?')
        .nth(1)?
        .split('&')
        .find_map(|pair| pair.strip_prefix("citation_for_view="))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE_HTML: &str = r#"
    <html><body>
      <table id="gsc_rsb_st">
        <tr><td class="gsc_rsb_std">1,234</td><td class="gsc_rsb_std">567</td></tr>
        <tr><td class="gsc_rsb_std">18</td><td class="gsc_rsb_std">12</td></tr>
        <tr><td class="gsc_rsb_std">25</td><td class="gsc_rsb_std">20</td></tr>
      </table>
      <table id="gsc_a_t"><tbody id="gsc_a_b">
        <tr class="gsc_a_tr">
          <td class="gsc_a_t">
            <a class="gsc_a_at" href="/citations?view_op=view_citation&amp;hl=en&amp;user=AbC&amp;citation_for_view=AbC:def456">Deep learning for tea leaves</a>
            <div class="gs_gray">A Author, B Coauthor</div>
            <div class="gs_gray">Journal of Tea Studies 12 (3), 45-67, 2021</div>
          </td>
          <td class="gsc_a_c"><a class="gsc_a_ac">41</a></td>
          <td class="gsc_a_y"><span class="gsc_a_h">2021</span></td>
        </tr>
        <tr class="gsc_a_tr">
          <td class="gsc_a_t">
            <a class="gsc_a_at" href="/citations?view_op=view_citation&amp;hl=en&amp;user=AbC&amp;citation_for_view=AbC:ghi789">Untitled preprint</a>
            <div class="gs_gray">A Author</div>
            <div class="gs_gray"></div>
          </td>
          <td class="gsc_a_c"></td>
          <td class="gsc_a_y"><span class="gsc_a_h"></span></td>
        </tr>
      </tbody></table>
    </body></html>
    "#;

    const DETAIL_HTML: &str = r#"
    <html><body>
      <div id="gsc_oci_title_gg"><div class="gsc_oci_title_ggi"><a href="https://arxiv.org/pdf/2101.00001.pdf">[PDF] arxiv.org</a></div></div>
      <div id="gsc_oci_title"><a class="gsc_oci_title_link" href="https://doi.org/10.1234/tea">Deep learning for tea leaves</a></div>
      <div id="gsc_oci_table">
        <div class="gs_scl"><div class="gsc_oci_field">Authors</div><div class="gsc_oci_value">A Author, B Coauthor</div></div>
        <div class="gs_scl"><div class="gsc_oci_field">Publication date</div><div class="gsc_oci_value">2021/3/15</div></div>
        <div class="gs_scl"><div class="gsc_oci_field">Journal</div><div class="gsc_oci_value">Journal of Tea Studies</div></div>
        <div class="gs_scl"><div class="gsc_oci_field">Description</div><div class="gsc_oci_value">We classify tea leaves with convolutional networks.</div></div>
        <div class="gs_scl"><div class="gsc_oci_field">Total citations</div><div class="gsc_oci_value"><a href="...cites=5...">Cited by 41</a></div></div>
      </div>
    </body></html>
    "#;

    #[test]
    fn parses_profile_stats_cells() {
        let (citations, h_index) = parse_profile_stats(PROFILE_HTML).expect("stats");
        assert_eq!(citations, 1234);
        assert_eq!(h_index, 18);
    }

    #[test]
    fn missing_stats_table_is_a_parse_error() {
        let result = parse_profile_stats("<html><body></body></html>");
        assert!(matches!(result, Err(ScholarError::Parse(_))));
    }

    #[test]
    fn parses_publication_rows_into_stubs() {
        let stubs = parse_publication_rows(PROFILE_HTML).expect("rows");
        assert_eq!(stubs.len(), 2);

        assert_eq!(stubs[0].title, "Deep learning for tea leaves");
        assert_eq!(stubs[0].key, "AbC:def456");
        assert_eq!(stubs[0].year.as_deref(), Some("2021"));
        assert_eq!(
            stubs[0].citation.as_deref(),
            Some("Journal of Tea Studies 12 (3), 45-67, 2021")
        );

        // Second row has no year and no venue line.
        assert_eq!(stubs[1].year, None);
        assert_eq!(stubs[1].citation, None);
    }

    #[test]
    fn empty_profile_has_no_rows() {
        let stubs =
            parse_publication_rows("<html><body><table></table></body></html>").expect("rows");
        assert!(stubs.is_empty());
    }

    #[test]
    fn parses_detail_page_fields() {
        let record = parse_publication_detail(DETAIL_HTML).expect("detail");
        assert_eq!(record.title.as_deref(), Some("Deep learning for tea leaves"));
        assert_eq!(record.year.as_deref(), Some("2021"));
        assert_eq!(record.num_citations, Some(41));
        assert_eq!(
            record.abstract_text.as_deref(),
            Some("We classify tea leaves with convolutional networks.")
        );
        assert_eq!(record.pub_url.as_deref(), Some("https://doi.org/10.1234/tea"));
        assert_eq!(
            record.eprint_url.as_deref(),
            Some("https://arxiv.org/pdf/2101.00001.pdf")
        );
        assert_eq!(record.authors, vec!["A Author", "B Coauthor"]);
    }

    #[test]
    fn extracts_citation_key_from_href() {
        assert_eq!(
            extract_citation_key(
                "/citations?view_op=view_citation&hl=en&user=AbC&citation_for_view=AbC:def456"
            )
            .as_deref(),
            Some("AbC:def456")
        );
        assert_eq!(extract_citation_key("/citations?user=AbC"), None);
    }
}
