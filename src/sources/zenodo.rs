//! Zenodo source adapter using the Zenodo records API (JSON).

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::{Config, SearchConfig};
use crate::matcher::{affiliation_matches, AuthorMatcher, ZenodoCreatorMatcher};
use crate::models::{AuthorQuery, LinkKind, Paper, PaperBuilder, NO_TITLE};
use crate::sources::{Source, SourceError};
use crate::utils::HttpClient;

/// Base URL for the Zenodo records API
const ZENODO_API_URL: &str = "https://zenodo.org/api/records";

/// Journal value used when a record carries no usable journal metadata
const ZENODO_JOURNAL: &str = "Zenodo";

/// Zenodo source adapter
///
/// Zenodo records mix two creator schemas (a nested `person_or_org` object
/// and a legacy flat form) and often write creator names as "Last, First",
/// so author filtering uses [`ZenodoCreatorMatcher`].
#[derive(Debug, Clone)]
pub struct ZenodoSource {
    client: HttpClient,
    search: SearchConfig,
    base_url: String,
}

impl ZenodoSource {
    /// Create a new Zenodo source with default settings
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    /// Create from configuration
    pub fn with_config(config: &Config) -> Self {
        Self {
            client: HttpClient::with_config(&config.http),
            search: config.search,
            base_url: ZENODO_API_URL.to_string(),
        }
    }

    /// Override the API base URL (for testing)
    #[allow(dead_code)]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Query phrasing variants, field-qualified before free-text
    fn search_strategies(query: &AuthorQuery) -> Vec<String> {
        let mut strategies = vec![
            format!("metadata.creators.person_or_org.name:\"{}\"", query.name),
            format!("\"{}\"", query.name),
        ];

        if let Some(school) = query.school_filter() {
            strategies.push(format!(
                "metadata.creators.person_or_org.name:\"{}\" AND metadata.creators.person_or_org.affiliation:\"{}\"",
                query.name, school
            ));
            strategies.push(format!("\"{}\" \"{}\"", query.name, school));
        }

        strategies
    }

    async fn fetch_page(&self, strategy: &str, page: usize) -> Result<ZenodoResponse, SourceError> {
        let url = format!(
            "{}?q={}&size={}&page={}&sort=mostrecent",
            self.base_url,
            urlencoding::encode(strategy),
            self.search.page_size,
            page
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to fetch Zenodo results: {}", e)))?;

        if !response.status().is_success() {
            return Err(SourceError::Api(format!(
                "Zenodo API returned status: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read response: {}", e)))?;
        serde_json::from_str(&body)
            .map_err(|e| SourceError::Parse(format!("Failed to parse Zenodo response: {}", e)))
    }

    /// Normalize a page of records, filtering on creator name and school
    fn normalize_records(records: &[ZenodoRecord], query: &AuthorQuery) -> Vec<Paper> {
        let matcher = ZenodoCreatorMatcher;
        let mut papers = Vec::new();

        for record in records {
            let meta = match &record.metadata {
                Some(m) => m,
                None => continue,
            };

            let mut builder = PaperBuilder::new();
            let mut author_found = false;
            let mut school_found = false;

            for creator in &meta.creators {
                let name = creator.display_name();
                if name.is_empty() {
                    continue;
                }
                let affiliation = creator.affiliation_name();
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

            let title = meta.title.as_deref().unwrap_or("").trim();
            builder = builder.title(if title.is_empty() { NO_TITLE } else { title });

            // publication_date with the record creation time as fallback
            let date = meta
                .publication_date
                .as_deref()
                .filter(|d| !d.is_empty())
                .or(record.created.as_deref())
                .unwrap_or("");
            builder = builder.publication_date(date);

            builder = builder.journal(journal_title(meta.journal.as_ref()));
            builder = builder.abstract_text(meta.description.as_deref().unwrap_or("").trim());
            builder = builder.categories(
                meta.keywords
                    .iter()
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty())
                    .collect(),
            );

            let doi = meta.doi.as_deref().unwrap_or("").trim();
            builder = builder.link(LinkKind::Doi, doi);

            for file in &record.files {
                let is_pdf = file.file_type.as_deref() == Some("pdf")
                    || file
                        .key
                        .as_deref()
                        .map(|k| k.ends_with(".pdf"))
                        .unwrap_or(false);
                if !is_pdf {
                    continue;
                }
                if let Some(links) = &file.links {
                    let url = links
                        .self_link
                        .as_deref()
                        .or(links.download.as_deref())
                        .unwrap_or("");
                    builder = builder.link(LinkKind::Pdf, url);
                }
            }

            let record_id = record
                .id
                .as_ref()
                .map(value_to_string)
                .unwrap_or_default();

            if !doi.is_empty() {
                builder = builder.link(LinkKind::Abstract, format!("https://doi.org/{}", doi));
            } else if !record_id.is_empty() {
                builder = builder.link(
                    LinkKind::Abstract,
                    format!("https://zenodo.org/record/{}", record_id),
                );
            }
            builder = builder.link(LinkKind::RecordId, record_id);

            papers.push(builder.build());
        }

        papers
    }
}

impl Default for ZenodoSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Journal metadata on Zenodo records is freeform; anything that is not an
/// object with a string `title` falls back to the platform name
fn journal_title(journal: Option<&serde_json::Value>) -> String {
    journal
        .and_then(|j| j.as_object())
        .and_then(|o| o.get("title"))
        .and_then(|t| t.as_str())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(ZENODO_JOURNAL)
        .to_string()
}

fn value_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

#[async_trait]
impl Source for ZenodoSource {
    fn id(&self) -> &str {
        "zenodo"
    }

    fn name(&self) -> &str {
        "Zenodo"
    }

    async fn collect(&self, query: &AuthorQuery) -> Result<Vec<Paper>, SourceError> {
        if !query.has_name() {
            tracing::debug!("no author name provided, skipping Zenodo search");
            return Ok(Vec::new());
        }

        let mut all_papers = Vec::new();

        'strategies: for strategy in Self::search_strategies(query) {
            for page in 1..=self.search.max_pages {
                let response = match self.fetch_page(&strategy, page).await {
                    Ok(response) => response,
                    Err(err) => {
                        tracing::warn!(%strategy, page, error = %err, "Zenodo request failed");
                        continue 'strategies;
                    }
                };

                let hits = response.hits.map(|h| h.hits).unwrap_or_default();
                if hits.is_empty() {
                    break;
                }

                let count = hits.len();
                all_papers.extend(Self::normalize_records(&hits, query));

                if count < self.search.page_size {
                    break;
                }

                tokio::time::sleep(Duration::from_millis(self.search.page_delay_ms)).await;
            }
        }

        Ok(all_papers)
    }
}

// ===== Zenodo API response types =====

#[derive(Debug, Deserialize)]
struct ZenodoResponse {
    hits: Option<ZenodoHits>,
}

#[derive(Debug, Deserialize)]
struct ZenodoHits {
    #[serde(default)]
    hits: Vec<ZenodoRecord>,
}

#[derive(Debug, Deserialize)]
struct ZenodoRecord {
    id: Option<serde_json::Value>,
    created: Option<String>,
    metadata: Option<ZenodoMetadata>,
    #[serde(default)]
    files: Vec<ZenodoFile>,
}

#[derive(Debug, Deserialize)]
struct ZenodoMetadata {
    title: Option<String>,
    publication_date: Option<String>,
    description: Option<String>,
    doi: Option<String>,
    // Freeform; some records carry a string or other shape here
    journal: Option<serde_json::Value>,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    creators: Vec<ZenodoCreator>,
}

#[derive(Debug, Deserialize)]
struct ZenodoCreator {
    person_or_org: Option<PersonOrOrg>,
    name: Option<String>,
    affiliation: Option<ZenodoAffiliation>,
}

impl ZenodoCreator {
    fn display_name(&self) -> String {
        self.person_or_org
            .as_ref()
            .and_then(|p| p.name.as_deref())
            .or(self.name.as_deref())
            .unwrap_or("")
            .trim()
            .to_string()
    }

    fn affiliation_name(&self) -> String {
        match &self.affiliation {
            Some(ZenodoAffiliation::Named { name }) => {
                name.as_deref().unwrap_or("").trim().to_string()
            }
            Some(ZenodoAffiliation::Plain(s)) => s.trim().to_string(),
            None => String::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PersonOrOrg {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ZenodoAffiliation {
    Named { name: Option<String> },
    Plain(String),
}

#[derive(Debug, Deserialize)]
struct ZenodoFile {
    #[serde(rename = "type")]
    file_type: Option<String>,
    key: Option<String>,
    links: Option<ZenodoFileLinks>,
}

#[derive(Debug, Deserialize)]
struct ZenodoFileLinks {
    #[serde(rename = "self")]
    self_link: Option<String>,
    download: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"{
      "hits": {
        "total": 2,
        "hits": [
          {
            "id": 7654321,
            "created": "2023-02-01T08:00:00+00:00",
            "metadata": {
              "title": "Dataset companion paper",
              "publication_date": "2023-01-15",
              "description": "A companion paper for the dataset.",
              "doi": "10.5281/zenodo.7654321",
              "journal": {"title": "Data in Brief"},
              "keywords": ["datasets", "reproducibility"],
              "creators": [
                {
                  "person_or_org": {"name": "Doe, Jane"},
                  "affiliation": {"name": "Stanford University"}
                },
                {"name": "Smith, John", "affiliation": "MIT"}
              ]
            },
            "files": [
              {
                "type": "pdf",
                "key": "paper.pdf",
                "links": {"self": "https://zenodo.org/api/files/abc/paper.pdf"}
              }
            ]
          },
          {
            "id": 1111111,
            "created": "2020-06-01T00:00:00+00:00",
            "metadata": {
              "title": "Unrelated deposit",
              "journal": "not an object",
              "creators": [{"name": "Other, Someone"}]
            }
          }
        ]
      }
    }"#;

    fn records() -> Vec<ZenodoRecord> {
        let response: ZenodoResponse = serde_json::from_str(RESPONSE).unwrap();
        response.hits.unwrap().hits
    }

    #[test]
    fn test_normalize_matches_reversed_creator_name() {
        let query = AuthorQuery::new("Jane Doe");
        let papers = ZenodoSource::normalize_records(&records(), &query);

        assert_eq!(papers.len(), 1);
        let paper = &papers[0];
        assert_eq!(paper.title, "Dataset companion paper");
        assert_eq!(paper.journal, "Data in Brief");
        assert_eq!(paper.publication_date, "2023-01-15");
        assert_eq!(paper.authors[0].name, "Doe, Jane");
        assert_eq!(paper.authors[0].affiliation, "Stanford University");
        assert_eq!(paper.authors[1].affiliation, "MIT");
    }

    #[test]
    fn test_normalize_links() {
        let query = AuthorQuery::new("Jane Doe");
        let papers = ZenodoSource::normalize_records(&records(), &query);

        let links = &papers[0].links;
        assert_eq!(links.doi(), Some("10.5281/zenodo.7654321"));
        assert_eq!(
            links.get(LinkKind::Pdf),
            Some("https://zenodo.org/api/files/abc/paper.pdf")
        );
        assert_eq!(
            links.get(LinkKind::Abstract),
            Some("https://doi.org/10.5281/zenodo.7654321")
        );
        assert_eq!(links.get(LinkKind::RecordId), Some("7654321"));
    }

    #[test]
    fn test_normalize_without_doi_uses_record_url() {
        let query = AuthorQuery::new("Someone Other");
        let papers = ZenodoSource::normalize_records(&records(), &query);

        assert_eq!(papers.len(), 1);
        let paper = &papers[0];
        // Malformed journal metadata falls back to the platform name
        assert_eq!(paper.journal, "Zenodo");
        // Missing publication_date falls back to the creation time
        assert_eq!(paper.publication_date, "2020-06-01T00:00:00+00:00");
        assert!(paper.doi().is_none());
        assert_eq!(
            paper.links.get(LinkKind::Abstract),
            Some("https://zenodo.org/record/1111111")
        );
    }

    #[test]
    fn test_normalize_school_filter() {
        let query = AuthorQuery::new("Jane Doe").school("Stanford");
        let papers = ZenodoSource::normalize_records(&records(), &query);
        assert_eq!(papers.len(), 1);

        let query = AuthorQuery::new("Jane Doe").school("Oxford");
        let papers = ZenodoSource::normalize_records(&records(), &query);
        assert!(papers.is_empty());
    }

    #[test]
    fn test_search_strategies() {
        let query = AuthorQuery::new("Jane Doe");
        let strategies = ZenodoSource::search_strategies(&query);
        assert_eq!(
            strategies[0],
            "metadata.creators.person_or_org.name:\"Jane Doe\""
        );
        assert_eq!(strategies[1], "\"Jane Doe\"");
        assert_eq!(strategies.len(), 2);
    }

    #[tokio::test]
    async fn test_collect_stops_on_empty_page() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"hits": {"total": 0, "hits": []}}"#)
            .expect(2)
            .create_async()
            .await;

        let source = ZenodoSource::new().with_base_url(server.url());
        let query = AuthorQuery::new("Jane Doe");
        let papers = source.collect(&query).await.unwrap();

        assert!(papers.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_collect_with_mock_server() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Any)
            .with_status(200)
            .with_body(RESPONSE)
            .create_async()
            .await;

        let source = ZenodoSource::new().with_base_url(server.url());
        let query = AuthorQuery::new("Jane Doe");
        let papers = source.collect(&query).await.unwrap();

        // Two strategies, one matching record each, short page ends paging
        assert_eq!(papers.len(), 2);
    }
}
