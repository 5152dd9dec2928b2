//! Mock source for testing purposes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::models::{AuthorQuery, LinkKind, Paper, PaperBuilder};
use crate::sources::{Source, SourceError};

/// A mock source that returns predefined papers and counts invocations.
#[derive(Debug, Default)]
pub struct MockSource {
    papers: Mutex<Vec<Paper>>,
    error: Mutex<Option<String>>,
    calls: AtomicUsize,
}

impl MockSource {
    /// Create a new mock source with no papers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock source that returns the given papers.
    pub fn with_papers(papers: Vec<Paper>) -> Self {
        Self {
            papers: Mutex::new(papers),
            error: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Make every collect call fail with the given message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            papers: Mutex::new(Vec::new()),
            error: Mutex::new(Some(message.into())),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of collect calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Source for MockSource {
    fn id(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &str {
        "Mock Source"
    }

    async fn collect(&self, _query: &AuthorQuery) -> Result<Vec<Paper>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.error.lock().unwrap().clone() {
            return Err(SourceError::Other(message));
        }
        Ok(self.papers.lock().unwrap().clone())
    }
}

/// Helper to create a paper with a title and optional DOI for testing.
pub fn make_paper(title: &str, doi: Option<&str>) -> Paper {
    let mut builder = PaperBuilder::new()
        .title(title)
        .author("Jane Doe", "Example University")
        .journal("Example Journal");
    if let Some(doi) = doi {
        builder = builder.link(LinkKind::Doi, doi);
    }
    builder.build()
}
