//! Paper model representing a normalized publication record from any source.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Title sentinel written by sources whose schema carries an explicit
/// "missing title" value (DOAJ, Zenodo, Crossref).
pub const NO_TITLE: &str = "No title";

/// Journal sentinel for sources that distinguish "journal unknown" from
/// "journal absent" (DOAJ, Crossref).
pub const NO_JOURNAL: &str = "No journal";

/// Kind of link or identifier attached to a paper.
///
/// `Doi` doubles as the cross-source identity key for deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Doi,
    Pdf,
    Abstract,
    Fulltext,
    ArxivId,
    Pmid,
    RecordId,
    Eissn,
    Pissn,
}

impl LinkKind {
    /// Stable identifier used in display output
    pub fn id(&self) -> &'static str {
        match self {
            LinkKind::Doi => "doi",
            LinkKind::Pdf => "pdf",
            LinkKind::Abstract => "abstract",
            LinkKind::Fulltext => "fulltext",
            LinkKind::ArxivId => "arxiv_id",
            LinkKind::Pmid => "pmid",
            LinkKind::RecordId => "record_id",
            LinkKind::Eissn => "eissn",
            LinkKind::Pissn => "pissn",
        }
    }
}

impl std::fmt::Display for LinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Map of link kind to value for a paper.
///
/// Absent kinds are simply not present; adapters never insert empty values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Links(BTreeMap<LinkKind, String>);

impl Links {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a link, ignoring empty values
    pub fn insert(&mut self, kind: LinkKind, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() {
            self.0.insert(kind, value);
        }
    }

    pub fn get(&self, kind: LinkKind) -> Option<&str> {
        self.0.get(&kind).map(|s| s.as_str())
    }

    /// The DOI, if present
    pub fn doi(&self) -> Option<&str> {
        self.get(LinkKind::Doi)
    }

    pub fn contains(&self, kind: LinkKind) -> bool {
        self.0.contains_key(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (LinkKind, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// An author entry as reported by a source.
///
/// `affiliation` is empty when the source did not report one; the merge step
/// backfills it from other sources when possible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub affiliation: String,
}

impl Author {
    pub fn new(name: impl Into<String>, affiliation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            affiliation: affiliation.into(),
        }
    }
}

/// A normalized publication record.
///
/// This struct is the single shape all source adapters produce and the
/// deduplication engine consumes. Field conventions:
///
/// - `title` is empty when the source omitted it; some sources write the
///   [`NO_TITLE`] sentinel instead.
/// - `publication_date` is best-effort text (`YYYY`, `YYYY-MM`, `YYYY-MM-DD`
///   or a full timestamp) and is never normalized to one representation.
/// - `categories` vocabularies are source-specific (arXiv class codes, MeSH
///   terms, free keywords) and are never unified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paper {
    /// Paper title
    pub title: String,

    /// Authors in source order
    pub authors: Vec<Author>,

    /// Publication date (format varies by source)
    pub publication_date: String,

    /// Journal name, or a source-specific default
    pub journal: String,

    /// Abstract text, possibly empty
    pub r#abstract: String,

    /// Categories/keywords/tags
    pub categories: Vec<String>,

    /// Links and identifiers
    pub links: Links,
}

impl Paper {
    /// Create an empty paper record
    pub fn new() -> Self {
        Self {
            title: String::new(),
            authors: Vec::new(),
            publication_date: String::new(),
            journal: String::new(),
            r#abstract: String::new(),
            categories: Vec::new(),
            links: Links::new(),
        }
    }

    /// The DOI, if present
    pub fn doi(&self) -> Option<&str> {
        self.links.doi()
    }

    /// Whether the title carries a usable value (non-empty and not the
    /// "No title" sentinel)
    pub fn has_title(&self) -> bool {
        let title = self.title.trim();
        !title.is_empty() && !title.eq_ignore_ascii_case(NO_TITLE)
    }
}

impl Default for Paper {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing Paper objects
#[derive(Debug, Clone, Default)]
pub struct PaperBuilder {
    paper: Paper,
}

impl PaperBuilder {
    pub fn new() -> Self {
        Self {
            paper: Paper::new(),
        }
    }

    /// Set the title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.paper.title = title.into();
        self
    }

    /// Append an author; empty names are dropped
    pub fn author(mut self, name: impl Into<String>, affiliation: impl Into<String>) -> Self {
        let name = name.into();
        if !name.is_empty() {
            self.paper.authors.push(Author::new(name, affiliation));
        }
        self
    }

    /// Set the authors list wholesale
    pub fn authors(mut self, authors: Vec<Author>) -> Self {
        self.paper.authors = authors;
        self
    }

    /// Set the publication date
    pub fn publication_date(mut self, date: impl Into<String>) -> Self {
        self.paper.publication_date = date.into();
        self
    }

    /// Set the journal
    pub fn journal(mut self, journal: impl Into<String>) -> Self {
        self.paper.journal = journal.into();
        self
    }

    /// Set the abstract text
    pub fn abstract_text(mut self, text: impl Into<String>) -> Self {
        self.paper.r#abstract = text.into();
        self
    }

    /// Set the categories
    pub fn categories(mut self, categories: Vec<String>) -> Self {
        self.paper.categories = categories;
        self
    }

    /// Add a link; empty values are dropped
    pub fn link(mut self, kind: LinkKind, value: impl Into<String>) -> Self {
        self.paper.links.insert(kind, value);
        self
    }

    /// Build the Paper
    pub fn build(self) -> Paper {
        self.paper
    }
}
