//! DOAJ source adapter using the Directory of Open Access Journals API (JSON).

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::{Config, SearchConfig};
use crate::matcher::{affiliation_matches, AuthorMatcher, SubstringMatcher};
use crate::models::{AuthorQuery, LinkKind, Paper, PaperBuilder, NO_JOURNAL, NO_TITLE};
use crate::sources::{Source, SourceError};
use crate::utils::HttpClient;

/// Base URL for the DOAJ article search API
const DOAJ_API_URL: &str = "https://doaj.org/api/search/articles";

/// DOAJ source adapter
///
/// The query is embedded in the URL path. Results are paged; a strategy
/// whose first page reports a zero total is abandoned immediately.
#[derive(Debug, Clone)]
pub struct DoajSource {
    client: HttpClient,
    search: SearchConfig,
    base_url: String,
}

impl DoajSource {
    /// Create a new DOAJ source with default settings
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    /// Create from configuration
    pub fn with_config(config: &Config) -> Self {
        Self {
            client: HttpClient::with_config(&config.http),
            search: config.search,
            base_url: DOAJ_API_URL.to_string(),
        }
    }

    /// Override the API base URL (for testing)
    #[allow(dead_code)]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Query phrasing variants, unquoted before quoted
    fn search_strategies(query: &AuthorQuery) -> Vec<String> {
        let mut strategies = vec![query.name.clone(), format!("\"{}\"", query.name)];

        if let Some(school) = query.school_filter() {
            strategies.push(format!("{} {}", query.name, school));
            strategies.push(format!("\"{}\" \"{}\"", query.name, school));
        }

        strategies
    }

    async fn fetch_page(
        &self,
        strategy: &str,
        page: usize,
    ) -> Result<DoajResponse, SourceError> {
        let url = format!(
            "{}/{}?page={}&pageSize={}",
            self.base_url,
            urlencoding::encode(strategy),
            page,
            self.search.page_size
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to fetch DOAJ results: {}", e)))?;

        if !response.status().is_success() {
            return Err(SourceError::Api(format!(
                "DOAJ API returned status: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read response: {}", e)))?;
        serde_json::from_str(&body)
            .map_err(|e| SourceError::Parse(format!("Failed to parse DOAJ response: {}", e)))
    }

    /// Normalize a page of records, filtering on author name and school
    fn normalize_records(records: &[DoajRecord], query: &AuthorQuery) -> Vec<Paper> {
        let matcher = SubstringMatcher;
        let mut papers = Vec::new();

        for record in records {
            let bibjson = match &record.bibjson {
                Some(b) => b,
                None => continue,
            };

            let mut builder = PaperBuilder::new();
            let mut author_found = false;
            let mut school_found = false;

            for author in &bibjson.author {
                let name = author.name.as_deref().unwrap_or("").trim();
                if name.is_empty() {
                    continue;
                }
                let affiliation = author.affiliation.as_deref().unwrap_or("").trim();
                if query.has_name() && matcher.matches(name, &query.name) {
                    author_found = true;
                }
                if let Some(school) = query.school_filter() {
                    if affiliation_matches(school, affiliation) {
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

            let title = bibjson.title.as_deref().unwrap_or("").trim();
            builder = builder.title(if title.is_empty() { NO_TITLE } else { title });

            builder = builder.publication_date(format_date(
                bibjson.year.as_deref(),
                bibjson.month.as_deref(),
            ));

            let journal = bibjson
                .journal
                .as_ref()
                .and_then(|j| j.title.as_deref())
                .unwrap_or("")
                .trim();
            builder = builder.journal(if journal.is_empty() { NO_JOURNAL } else { journal });

            builder = builder.abstract_text(bibjson.r#abstract.as_deref().unwrap_or("").trim());
            builder = builder.categories(
                bibjson
                    .keywords
                    .iter()
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty())
                    .collect(),
            );

            for identifier in &bibjson.identifier {
                let id_type = identifier.id_type.as_deref().unwrap_or("");
                let value = identifier.id.as_deref().unwrap_or("").trim();
                let kind = match id_type.to_lowercase().as_str() {
                    "doi" => LinkKind::Doi,
                    "eissn" => LinkKind::Eissn,
                    "pissn" => LinkKind::Pissn,
                    _ => continue,
                };
                builder = builder.link(kind, value);
            }

            for link in &bibjson.link {
                if link.link_type.as_deref() != Some("fulltext") {
                    continue;
                }
                let url = link.url.as_deref().unwrap_or("").trim();
                let kind = if link.content_type.as_deref() == Some("pdf") {
                    LinkKind::Pdf
                } else {
                    LinkKind::Abstract
                };
                builder = builder.link(kind, url);
            }

            if let Some(id) = record.id.as_deref().filter(|id| !id.is_empty()) {
                builder = builder.link(LinkKind::RecordId, id);
            }

            papers.push(builder.build());
        }

        papers
    }
}

impl Default for DoajSource {
    fn default() -> Self {
        Self::new()
    }
}

/// `YYYY` when only the year is known, `YYYY-MM` with a zero-padded month
/// when both are
fn format_date(year: Option<&str>, month: Option<&str>) -> String {
    let year = year.unwrap_or("").trim();
    if year.is_empty() {
        return String::new();
    }
    match month.map(str::trim).filter(|m| !m.is_empty()) {
        Some(month) => match month.parse::<u32>() {
            Ok(m) => format!("{}-{:02}", year, m),
            Err(_) => format!("{}-{}", year, month),
        },
        None => year.to_string(),
    }
}

#[async_trait]
impl Source for DoajSource {
    fn id(&self) -> &str {
        "doaj"
    }

    fn name(&self) -> &str {
        "DOAJ"
    }

    async fn collect(&self, query: &AuthorQuery) -> Result<Vec<Paper>, SourceError> {
        if !query.has_name() {
            tracing::debug!("no author name provided, skipping DOAJ search");
            return Ok(Vec::new());
        }

        let mut all_papers = Vec::new();

        'strategies: for strategy in Self::search_strategies(query) {
            for page in 1..=self.search.max_pages {
                let response = match self.fetch_page(&strategy, page).await {
                    Ok(response) => response,
                    Err(err) => {
                        tracing::warn!(%strategy, page, error = %err, "DOAJ request failed");
                        continue 'strategies;
                    }
                };

                if page == 1 && response.total == 0 {
                    continue 'strategies;
                }

                let count = response.results.len();
                all_papers.extend(Self::normalize_records(&response.results, query));

                if count < self.search.page_size {
                    break;
                }

                tokio::time::sleep(Duration::from_millis(self.search.page_delay_ms)).await;
            }
        }

        Ok(all_papers)
    }
}

// ===== DOAJ API response types =====

#[derive(Debug, Deserialize)]
struct DoajResponse {
    #[serde(default)]
    total: u64,
    #[serde(default)]
    results: Vec<DoajRecord>,
}

#[derive(Debug, Deserialize)]
struct DoajRecord {
    id: Option<String>,
    bibjson: Option<Bibjson>,
}

#[derive(Debug, Deserialize)]
struct Bibjson {
    title: Option<String>,
    year: Option<String>,
    month: Option<String>,
    #[serde(default)]
    author: Vec<DoajAuthor>,
    journal: Option<DoajJournal>,
    #[serde(default)]
    identifier: Vec<DoajIdentifier>,
    #[serde(default)]
    link: Vec<DoajLink>,
    #[serde(default)]
    keywords: Vec<String>,
    r#abstract: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DoajAuthor {
    name: Option<String>,
    affiliation: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DoajJournal {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DoajIdentifier {
    #[serde(rename = "type")]
    id_type: Option<String>,
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DoajLink {
    #[serde(rename = "type")]
    link_type: Option<String>,
    url: Option<String>,
    content_type: Option<String>,
}
