//! Collector facade that fans a query out across all enabled sources.

use std::sync::Arc;

use crate::config::Config;
use crate::models::{AuthorQuery, Paper};
use crate::sources::Source;
use crate::utils::deduplicate_papers;

/// Aggregates publication records for one author across every enabled
/// source, then deduplicates and merges the combined results.
///
/// Sources run in a fixed order and are fault-isolated: a source that
/// fails outright is logged and skipped, and the remaining sources still
/// contribute.
#[derive(Debug)]
pub struct PaperCollector {
    sources: Vec<Arc<dyn Source>>,
}

impl PaperCollector {
    /// Create a collector with every compiled-in source enabled
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    /// Create a collector from configuration
    pub fn with_config(config: &Config) -> Self {
        // Suppress the unused warning when all source features are off
        let _ = config;
        let mut sources: Vec<Arc<dyn Source>> = Vec::new();

        #[cfg(feature = "source-arxiv")]
        sources.push(Arc::new(crate::sources::ArxivSource::with_config(config)));
        #[cfg(feature = "source-pubmed")]
        sources.push(Arc::new(crate::sources::PubMedSource::with_config(config)));
        #[cfg(feature = "source-doaj")]
        sources.push(Arc::new(crate::sources::DoajSource::with_config(config)));
        #[cfg(feature = "source-zenodo")]
        sources.push(Arc::new(crate::sources::ZenodoSource::with_config(config)));
        #[cfg(feature = "source-crossref")]
        sources.push(Arc::new(crate::sources::CrossrefSource::with_config(config)));

        Self { sources }
    }

    /// Create a collector over an explicit set of sources
    pub fn with_sources(sources: Vec<Arc<dyn Source>>) -> Self {
        Self { sources }
    }

    /// The sources this collector queries, in query order
    pub fn sources(&self) -> &[Arc<dyn Source>] {
        &self.sources
    }

    /// Collect, deduplicate and merge papers for the target author.
    ///
    /// An empty author name yields an empty list without touching any
    /// source.
    pub async fn get_papers(&self, query: &AuthorQuery) -> Vec<Paper> {
        if !query.has_name() {
            tracing::warn!("no author name provided, nothing to collect");
            return Vec::new();
        }

        let mut all_papers = Vec::new();

        for source in &self.sources {
            match source.collect(query).await {
                Ok(papers) => {
                    tracing::info!(source = source.id(), count = papers.len(), "source done");
                    all_papers.extend(papers);
                }
                Err(err) => {
                    tracing::warn!(source = source.id(), error = %err, "source failed, skipping");
                }
            }
        }

        let total = all_papers.len();
        let papers = deduplicate_papers(all_papers);
        tracing::info!(
            collected = total,
            unique = papers.len(),
            "collection complete"
        );
        papers
    }
}

impl Default for PaperCollector {
    fn default() -> Self {
        Self::new()
    }
}
