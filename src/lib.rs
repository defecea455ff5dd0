//! # scholarstats
//!
//! Google Scholar profile stats updater.
//!
//! Resolves one author profile, expands the most recent publications, and
//! serializes aggregate citation metrics to a JSON file for the website.
//!
//! ## Modules
//!
//! - [`provider`] - Data-source abstraction (resolve author, expand publication)
//! - [`gscholar`] - Google Scholar scraping provider
//! - [`retry`] - Exponential-backoff wrapper around provider calls
//! - [`pipeline`] - Sequential fetch/expand/assemble pipeline
//! - [`stats`] - Selection, normalization, and JSON output
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use scholarstats::gscholar::GoogleScholarClient;
//! use scholarstats::pipeline::{collect_stats, UpdateOptions};
//!
//! #[tokio::main]
//! async fn main() -> scholarstats::Result<()> {
//!     let client = GoogleScholarClient::new()?;
//!     let stats = collect_stats(&client, "AbCdEfGhIjK", &UpdateOptions::default()).await?;
//!     println!("{} citations", stats.citations);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod gscholar;
pub mod pipeline;
pub mod provider;
pub mod retry;
pub mod stats;

pub use error::{Result, ScholarError};
