//! Source adapters with an extensible trait-based architecture.
//!
//! This module defines the [`Source`] trait that all bibliographic source
//! adapters implement. An adapter translates one external API's response
//! format into normalized [`Paper`] records, applying its author and
//! affiliation filters during extraction. New sources can be added by
//! implementing the trait and handing the adapter to
//! [`PaperCollector::with_sources`](crate::PaperCollector::with_sources).
//!
//! # Feature Flags
//!
//! Individual sources can be disabled at compile time using Cargo features:
//!
//! - `arxiv` - Enable arXiv source (default: enabled)
//! - `pubmed` - Enable PubMed source (default: enabled)
//! - `doaj` - Enable DOAJ source (default: enabled)
//! - `zenodo` - Enable Zenodo source (default: enabled)
//! - `crossref` - Enable Crossref source (default: enabled)
//!
//! ```bash
//! # Compile only the XML-backed sources
//! cargo build --no-default-features --features "arxiv,pubmed"
//! ```
//!
//! # Failure tolerance
//!
//! Adapters are defensively permissive. A transport or parse failure for
//! one query-phrasing variant is logged and contributes zero records while
//! the remaining variants still run; missing fields degrade to empty
//! strings/lists. The collector additionally swallows whole-adapter errors,
//! so a completely unreachable source only costs its own contribution.

#[cfg(feature = "source-arxiv")]
mod arxiv;
#[cfg(feature = "source-crossref")]
mod crossref;
#[cfg(feature = "source-doaj")]
mod doaj;
#[cfg(feature = "source-pubmed")]
mod pubmed;
#[cfg(feature = "source-zenodo")]
mod zenodo;

pub mod mock;

#[cfg(feature = "source-arxiv")]
pub use arxiv::ArxivSource;
#[cfg(feature = "source-crossref")]
pub use crossref::CrossrefSource;
#[cfg(feature = "source-doaj")]
pub use doaj::DoajSource;
pub use mock::MockSource;
#[cfg(feature = "source-pubmed")]
pub use pubmed::PubMedSource;
#[cfg(feature = "source-zenodo")]
pub use zenodo::ZenodoSource;

use crate::models::{AuthorQuery, Paper};
use async_trait::async_trait;

/// A bibliographic source adapter.
///
/// `collect` runs every query-phrasing variant for the source and returns
/// the union of extracted, filtered paper records. An empty query name must
/// resolve to an empty list without any remote call.
#[async_trait]
pub trait Source: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source (e.g. "arxiv", "pubmed")
    fn id(&self) -> &str;

    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Collect papers for the target author from this source
    async fn collect(&self, query: &AuthorQuery) -> Result<Vec<Paper>, SourceError>;
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Parsing error (XML, JSON)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// API error from the source (non-2xx status)
    #[error("API error: {0}")]
    Api(String),

    /// Other error
    #[error("Error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}

impl From<quick_xml::DeError> for SourceError {
    fn from(err: quick_xml::DeError) -> Self {
        SourceError::Parse(format!("XML: {}", err))
    }
}
