//! Utility modules supporting paper collection.
//!
//! - [`deduplicate_papers`]: group records by DOI (else normalized title)
//!   and merge each group into one complete record
//! - [`HttpClient`]: shared HTTP client with timeouts and a proper user agent
//!
//! # Deduplication
//!
//! ```rust
//! use paper_collector::utils::deduplicate_papers;
//! use paper_collector::models::Paper;
//!
//! # fn example(papers: Vec<Paper>) {
//! let unique = deduplicate_papers(papers);
//! # }
//! ```

mod dedup;
mod http;

pub use dedup::deduplicate_papers;
pub use http::HttpClient;
