//! arXiv source adapter using the arXiv export API (Atom/XML).

use async_trait::async_trait;
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::config::{Config, SearchConfig};
use crate::matcher::{AuthorMatcher, SubstringMatcher};
use crate::models::{AuthorQuery, LinkKind, Paper, PaperBuilder};
use crate::sources::{Source, SourceError};
use crate::utils::HttpClient;

/// Base URL for the arXiv export API
const ARXIV_API_URL: &str = "http://export.arxiv.org/api/query";

/// arXiv source adapter
///
/// Filters entries to the target author with loose substring matching and
/// keeps the raw `published` timestamp as the publication date.
#[derive(Debug, Clone)]
pub struct ArxivSource {
    client: HttpClient,
    search: SearchConfig,
    base_url: String,
}

impl ArxivSource {
    /// Create a new arXiv source with default settings
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    /// Create from configuration
    pub fn with_config(config: &Config) -> Self {
        Self {
            client: HttpClient::with_config(&config.http),
            search: config.search,
            base_url: ARXIV_API_URL.to_string(),
        }
    }

    /// Override the API base URL (for testing)
    #[allow(dead_code)]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Query phrasing variants, broadest recall first
    fn search_strategies(query: &AuthorQuery) -> Vec<String> {
        let mut strategies = vec![
            format!("au:\"{}\"", query.name),
            format!("au:{}", query.name),
        ];

        if let Some(school) = query.school_filter() {
            strategies.push(format!("au:\"{}\" AND aff:\"{}\"", query.name, school));
            strategies.push(format!("au:{} OR aff:{}", query.name, school));
        }

        strategies
    }

    async fn fetch(&self, url: &str) -> Result<String, SourceError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/atom+xml")
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to fetch arXiv results: {}", e)))?;

        if !response.status().is_success() {
            return Err(SourceError::Api(format!(
                "arXiv API returned status: {}",
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read response: {}", e)))
    }

    /// Parse an Atom response into filtered paper records
    fn parse_response(xml: &str, query: &AuthorQuery) -> Result<Vec<Paper>, SourceError> {
        let feed: Feed = from_str(xml)
            .map_err(|e| SourceError::Parse(format!("Failed to parse arXiv Atom feed: {}", e)))?;

        let matcher = SubstringMatcher;
        let mut papers = Vec::new();

        for entry in feed.entries {
            let mut builder = PaperBuilder::new().journal("arXiv");
            let mut author_found = false;

            for author in &entry.authors {
                let name = text(&author.name);
                let affiliation = text(&author.affiliation);
                if name.is_empty() {
                    continue;
                }
                if query.has_name() && matcher.matches(&name, &query.name) {
                    author_found = true;
                }
                builder = builder.author(name, affiliation);
            }

            if query.has_name() && !author_found {
                continue;
            }

            builder = builder.title(text(&entry.title));

            // The entry id is a URL like http://arxiv.org/abs/2301.12345v1;
            // the trailing path segment is the arXiv id
            let id_url = text(&entry.id);
            if let Some(arxiv_id) = id_url.rsplit('/').next().filter(|s| !s.is_empty()) {
                builder = builder
                    .link(LinkKind::Pdf, format!("https://arxiv.org/pdf/{}", arxiv_id))
                    .link(
                        LinkKind::Abstract,
                        format!("https://arxiv.org/abs/{}", arxiv_id),
                    )
                    .link(LinkKind::ArxivId, arxiv_id);
            }

            builder = builder.link(LinkKind::Doi, text(&entry.doi));

            // Kept verbatim, not reformatted
            builder = builder.publication_date(text(&entry.published));

            let categories: Vec<String> = entry
                .categories
                .iter()
                .filter_map(|c| c.term.clone())
                .filter(|t| !t.is_empty())
                .collect();
            builder = builder.categories(categories);

            builder = builder.abstract_text(text(&entry.summary));

            papers.push(builder.build());
        }

        Ok(papers)
    }
}

impl Default for ArxivSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for ArxivSource {
    fn id(&self) -> &str {
        "arxiv"
    }

    fn name(&self) -> &str {
        "arXiv"
    }

    async fn collect(&self, query: &AuthorQuery) -> Result<Vec<Paper>, SourceError> {
        if !query.has_name() {
            tracing::debug!("no author name provided, skipping arXiv search");
            return Ok(Vec::new());
        }

        let mut all_papers = Vec::new();

        for strategy in Self::search_strategies(query) {
            let url = format!(
                "{}?search_query={}&max_results={}",
                self.base_url,
                urlencoding::encode(&strategy),
                self.search.page_size
            );

            match self.fetch(&url).await {
                Ok(body) => match Self::parse_response(&body, query) {
                    Ok(mut papers) => {
                        tracing::debug!(%strategy, count = papers.len(), "arXiv strategy done");
                        all_papers.append(&mut papers);
                    }
                    Err(err) => {
                        tracing::warn!(%strategy, error = %err, "failed to parse arXiv response");
                    }
                },
                Err(err) => {
                    tracing::warn!(%strategy, error = %err, "arXiv request failed");
                }
            }
        }

        Ok(all_papers)
    }
}

// ===== arXiv Atom feed types =====

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(rename = "entry", default)]
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    id: Option<Text>,
    title: Option<Text>,
    summary: Option<Text>,
    published: Option<Text>,
    #[serde(rename = "author", default)]
    authors: Vec<EntryAuthor>,
    #[serde(rename = "category", default)]
    categories: Vec<EntryCategory>,
    // quick-xml exposes the namespaced arxiv:doi element by its local name
    #[serde(rename = "doi")]
    doi: Option<Text>,
}

#[derive(Debug, Deserialize)]
struct EntryAuthor {
    name: Option<Text>,
    // Local name of the namespaced arxiv:affiliation element
    #[serde(rename = "affiliation")]
    affiliation: Option<Text>,
}

#[derive(Debug, Deserialize)]
struct EntryCategory {
    #[serde(rename = "@term")]
    term: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Text {
    #[serde(rename = "$text", default)]
    value: Option<String>,
}

fn text(node: &Option<Text>) -> String {
    node.as_ref()
        .and_then(|t| t.value.as_deref())
        .unwrap_or_default()
        .trim()
        .to_string()
}
