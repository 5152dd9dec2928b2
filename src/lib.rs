//! # Paper Collector
//!
//! Aggregates a researcher's publication records from multiple scholarly
//! sources (arXiv, PubMed, DOAJ, Zenodo, Crossref), normalizes them into a
//! single paper shape, and deduplicates the combined results by DOI and
//! title.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (Paper, AuthorQuery, links)
//! - [`sources`]: Source adapters with an extensible trait-based architecture
//! - [`matcher`]: Author-name matching policies used by the adapters
//! - [`collector`]: Facade that fans a query out across all sources
//! - [`utils`]: HTTP client and deduplication
//! - [`config`]: Configuration management
//!
//! ## Example
//!
//! ```no_run
//! use paper_collector::{AuthorQuery, PaperCollector};
//!
//! # async fn run() {
//! let collector = PaperCollector::new();
//! let query = AuthorQuery::new("Jane Doe").school("Stanford University");
//! let papers = collector.get_papers(&query).await;
//! for paper in papers {
//!     println!("{} ({})", paper.title, paper.journal);
//! }
//! # }
//! ```

pub mod collector;
pub mod config;
pub mod matcher;
pub mod models;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use collector::PaperCollector;
pub use models::{Author, AuthorQuery, LinkKind, Links, Paper, PaperBuilder};
pub use sources::{Source, SourceError};
pub use utils::deduplicate_papers;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
