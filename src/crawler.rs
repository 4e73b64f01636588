//! # Website Crawler Module
//!
//! This module provides the first stage of the pipeline: crawling a website
//! breadth-first and extracting indexable content blocks from every visited
//! page.
//!
//! ## Key Components
//!
//! - `CrawlerConfig`: Configuration for the crawler (page budget, timeout, user agent)
//! - `ContentBlock`: A heading paired with its first following paragraph
//! - `CrawlReport`: Blocks plus visit/failure counts for one crawl
//! - `crawl_site`: Breadth-first crawl restricted to the seed's host
//! - `extract_blocks`: Pure extraction of heading/paragraph pairs from a parsed page
//!
//! Fetch failures degrade to absence: a page that cannot be fetched or parsed
//! contributes nothing and the crawl moves on, with the failure counted in the
//! report.

mod config;
mod error;
mod extraction;
mod fetch;

pub use config::CrawlerConfig;
pub use error::CrawlError;
pub use extraction::extract_blocks;
pub use fetch::{crawl_site, http_client};

use serde::{Deserialize, Serialize};

/// A unit of indexable material: one heading and its following paragraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Combined visible text of the heading and paragraph, whitespace-collapsed
    pub text: String,

    /// Reconstructed fragment wrapping the original heading and paragraph markup
    pub html: String,

    /// Absolute URL of the page the block was extracted from
    pub source_url: String,
}

/// Everything one crawl invocation produced.
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Content blocks across all visited pages, in visit order
    pub blocks: Vec<ContentBlock>,

    /// Number of pages fetched (including failed attempts)
    pub pages_visited: usize,

    /// Number of pages whose fetch or parse failed and was skipped
    pub failed_pages: usize,
}
