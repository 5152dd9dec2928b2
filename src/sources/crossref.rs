//! Crossref source adapter using the Crossref works API (JSON).

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::Config;
use crate::matcher::{affiliation_matches, AuthorMatcher, CrossrefStagedMatcher};
use crate::models::{AuthorQuery, LinkKind, Paper, PaperBuilder, NO_JOURNAL, NO_TITLE};
use crate::sources::{Source, SourceError};
use crate::utils::HttpClient;

/// Base URL for the Crossref works API
const CROSSREF_API_URL: &str = "https://api.crossref.org/works";

/// Crossref source adapter
///
/// A single `query.author` request, no paging. Crossref's bibliographic
/// search is loose, so results are filtered with the strict
/// [`CrossrefStagedMatcher`] rather than substring containment.
#[derive(Debug, Clone)]
pub struct CrossrefSource {
    client: HttpClient,
    base_url: String,
}

impl CrossrefSource {
    /// Create a new Crossref source with default settings
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    /// Create from configuration
    pub fn with_config(config: &Config) -> Self {
        Self {
            client: HttpClient::with_config(&config.http),
            base_url: CROSSREF_API_URL.to_string(),
        }
    }

    /// Override the API base URL (for testing)
    #[allow(dead_code)]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn fetch(&self, query: &AuthorQuery) -> Result<CrossrefResponse, SourceError> {
        let url = format!(
            "{}?query.author={}",
            self.base_url,
            query.name.replace(' ', "+")
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to fetch Crossref results: {}", e)))?;

        if !response.status().is_success() {
            return Err(SourceError::Api(format!(
                "Crossref API returned status: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read response: {}", e)))?;
        serde_json::from_str(&body)
            .map_err(|e| SourceError::Parse(format!("Failed to parse Crossref response: {}", e)))
    }

    /// Normalize work items, filtering on author name and school
    fn normalize_items(items: &[CrossrefWork], query: &AuthorQuery) -> Vec<Paper> {
        let matcher = CrossrefStagedMatcher;
        let mut papers = Vec::new();

        for item in items {
            let mut builder = PaperBuilder::new();
            let mut author_found = false;
            let mut school_found = false;

            for author in &item.author {
                let given = author.given.as_deref().unwrap_or("").trim();
                let family = author.family.as_deref().unwrap_or("").trim();
                let name = format!("{} {}", given, family).trim().to_string();
                if name.is_empty() {
                    continue;
                }

                let affiliation = author
                    .affiliation
                    .iter()
                    .filter_map(CrossrefAffiliation::name)
                    .collect::<Vec<_>>()
                    .join("; ");

                if query.has_name() && matcher.matches(&name, &query.name) {
                    author_found = true;
                }
                if let Some(school) = query.school_filter() {
                    if affiliation_matches(school, &affiliation) {
                        school_found = true;
                    }
                }
                builder = builder.author(name, affiliation);
            }

            if query.has_name() && !author_found {
                continue;
            }
            if query.school_filter().is_some() && !school_found {
                continue;
            }

            // Crossref titles arrive as an array of segments
            let title_parts: Vec<&str> = item
                .title
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .collect();
            builder = builder.title(if title_parts.is_empty() {
                NO_TITLE.to_string()
            } else {
                title_parts.join(" ")
            });

            if let Some(date) = item
                .published_print
                .as_ref()
                .and_then(|p| p.date_parts.first())
                .map(|parts| format_date_parts(parts))
                .filter(|d| !d.is_empty())
            {
                builder = builder.publication_date(date);
            }

            let journal = item
                .container_title
                .first()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .unwrap_or(NO_JOURNAL);
            builder = builder.journal(journal);

            builder = builder.abstract_text(item.r#abstract.as_deref().unwrap_or("").trim());
            builder = builder.categories(
                item.subject
                    .iter()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            );

            if let Some(doi) = item.doi.as_deref().filter(|d| !d.is_empty()) {
                builder = builder
                    .link(LinkKind::Doi, doi)
                    .link(LinkKind::Abstract, format!("https://doi.org/{}", doi));
            }

            for link in &item.link {
                let url = link.url.as_deref().unwrap_or("");
                if link.content_type.as_deref() == Some("application/pdf") {
                    builder = builder.link(LinkKind::Pdf, url);
                } else if link.intended_application.as_deref() == Some("text-mining") {
                    builder = builder.link(LinkKind::Fulltext, url);
                }
            }

            papers.push(builder.build());
        }

        papers
    }
}

impl Default for CrossrefSource {
    fn default() -> Self {
        Self::new()
    }
}

/// `date-parts` is `[year, month, day]` with trailing parts optional
fn format_date_parts(parts: &[u32]) -> String {
    match parts {
        [year, month, day, ..] => format!("{}-{:02}-{:02}", year, month, day),
        [year, month] => format!("{}-{:02}", year, month),
        [year] => year.to_string(),
        [] => String::new(),
    }
}

#[async_trait]
impl Source for CrossrefSource {
    fn id(&self) -> &str {
        "crossref"
    }

    fn name(&self) -> &str {
        "Crossref"
    }

    async fn collect(&self, query: &AuthorQuery) -> Result<Vec<Paper>, SourceError> {
        if !query.has_name() {
            tracing::debug!("no author name provided, skipping Crossref search");
            return Ok(Vec::new());
        }

        let response = self.fetch(query).await?;
        let items = response.message.map(|m| m.items).unwrap_or_default();
        Ok(Self::normalize_items(&items, query))
    }
}

// ===== Crossref API response types =====

#[derive(Debug, Deserialize)]
struct CrossrefResponse {
    message: Option<CrossrefMessage>,
}

#[derive(Debug, Deserialize)]
struct CrossrefMessage {
    #[serde(default)]
    items: Vec<CrossrefWork>,
}

#[derive(Debug, Deserialize)]
struct CrossrefWork {
    #[serde(default)]
    title: Vec<String>,
    #[serde(default)]
    author: Vec<CrossrefAuthor>,
    #[serde(rename = "published-print")]
    published_print: Option<CrossrefDate>,
    #[serde(rename = "container-title", default)]
    container_title: Vec<String>,
    r#abstract: Option<String>,
    #[serde(default)]
    subject: Vec<String>,
    #[serde(rename = "DOI")]
    doi: Option<String>,
    #[serde(default)]
    link: Vec<CrossrefLink>,
}

#[derive(Debug, Deserialize)]
struct CrossrefAuthor {
    given: Option<String>,
    family: Option<String>,
    #[serde(default)]
    affiliation: Vec<CrossrefAffiliation>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CrossrefAffiliation {
    Named { name: Option<String> },
    Plain(String),
}

impl CrossrefAffiliation {
    fn name(&self) -> Option<String> {
        match self {
            CrossrefAffiliation::Named { name } => {
                name.as_deref().map(|n| n.trim().to_string())
            }
            CrossrefAffiliation::Plain(s) => Some(s.trim().to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CrossrefDate {
    #[serde(rename = "date-parts", default)]
    date_parts: Vec<Vec<u32>>,
}

#[derive(Debug, Deserialize)]
struct CrossrefLink {
    #[serde(rename = "URL")]
    url: Option<String>,
    #[serde(rename = "content-type")]
    content_type: Option<String>,
    #[serde(rename = "intended-application")]
    intended_application: Option<String>,
}
