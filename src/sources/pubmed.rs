//! PubMed source adapter using the NCBI E-utilities (esearch + efetch, XML).

use std::time::Duration;

use async_trait::async_trait;
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::config::{Config, SearchConfig};
use crate::matcher::{AuthorMatcher, SubstringMatcher};
use crate::models::{AuthorQuery, LinkKind, Paper, PaperBuilder};
use crate::sources::{Source, SourceError};
use crate::utils::HttpClient;

/// Base URL for the NCBI E-utilities
const EUTILS_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// PubMed source adapter
///
/// Searches in two steps: esearch resolves a query to PMIDs, efetch
/// retrieves full article records in small batches with a courtesy delay
/// between batches.
#[derive(Debug, Clone)]
pub struct PubMedSource {
    client: HttpClient,
    search: SearchConfig,
    base_url: String,
}

impl PubMedSource {
    /// Create a new PubMed source with default settings
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    /// Create from configuration
    pub fn with_config(config: &Config) -> Self {
        Self {
            client: HttpClient::with_config(&config.http),
            search: config.search,
            base_url: EUTILS_BASE_URL.to_string(),
        }
    }

    /// Override the API base URL (for testing)
    #[allow(dead_code)]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Query phrasing variants using PubMed field tags
    fn search_strategies(query: &AuthorQuery) -> Vec<String> {
        let mut strategies = vec![
            format!("\"{}\"[Author]", query.name),
            format!("{}[Author]", query.name),
        ];

        if let Some(school) = query.school_filter() {
            strategies.push(format!(
                "\"{}\"[Author] AND \"{}\"[Affiliation]",
                query.name, school
            ));
            strategies.push(format!("{}[Author] AND {}[Affiliation]", query.name, school));
        }

        strategies
    }

    async fn fetch(&self, url: &str) -> Result<String, SourceError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/xml")
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to fetch PubMed results: {}", e)))?;

        if !response.status().is_success() {
            return Err(SourceError::Api(format!(
                "PubMed API returned status: {}",
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read response: {}", e)))
    }

    /// Resolve a search strategy to a list of PMIDs
    async fn search_ids(&self, strategy: &str) -> Result<Vec<String>, SourceError> {
        let url = format!(
            "{}/esearch.fcgi?db=pubmed&term={}&retmax={}&retmode=xml&usehistory=y",
            self.base_url,
            urlencoding::encode(strategy),
            self.search.page_size
        );
        let body = self.fetch(&url).await?;
        Self::parse_id_list(&body)
    }

    fn parse_id_list(xml: &str) -> Result<Vec<String>, SourceError> {
        let result: ESearchResult = from_str(xml)
            .map_err(|e| SourceError::Parse(format!("Failed to parse esearch result: {}", e)))?;
        Ok(result
            .id_list
            .map(|list| {
                list.ids
                    .iter()
                    .map(text_of)
                    .filter(|id| !id.is_empty())
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Fetch and parse article records for a batch of PMIDs
    async fn fetch_batch(
        &self,
        ids: &[String],
        query: &AuthorQuery,
    ) -> Result<Vec<Paper>, SourceError> {
        let url = format!(
            "{}/efetch.fcgi?db=pubmed&id={}&retmode=xml",
            self.base_url,
            ids.join(",")
        );
        let body = self.fetch(&url).await?;
        Self::parse_articles(&body, query)
    }

    /// Parse an efetch response into filtered paper records
    fn parse_articles(xml: &str, query: &AuthorQuery) -> Result<Vec<Paper>, SourceError> {
        let set: PubmedArticleSet = from_str(xml)
            .map_err(|e| SourceError::Parse(format!("Failed to parse efetch result: {}", e)))?;

        let matcher = SubstringMatcher;
        let mut papers = Vec::new();

        for article in set.articles {
            let citation = match article.citation {
                Some(c) => c,
                None => continue,
            };
            let details = match citation.article {
                Some(a) => a,
                None => continue,
            };

            let mut builder = PaperBuilder::new();
            let mut author_found = false;

            if let Some(list) = &details.author_list {
                for author in &list.authors {
                    let fore = text(&author.fore_name);
                    let last = text(&author.last_name);
                    let name = format!("{} {}", fore, last).trim().to_string();
                    if name.is_empty() {
                        continue;
                    }
                    if query.has_name() && matcher.matches(&name, &query.name) {
                        author_found = true;
                    }
                    let affiliation = author
                        .affiliations
                        .first()
                        .map(|info| text(&info.affiliation))
                        .unwrap_or_default();
                    builder = builder.author(name, affiliation);
                }
            }

            if query.has_name() && !author_found {
                continue;
            }

            builder = builder.title(text(&details.title));

            // PubDate parts joined as-is; the month may be a name like "May"
            if let Some(journal) = &details.journal {
                builder = builder.journal(text(&journal.title));
                if let Some(issue) = &journal.issue {
                    if let Some(date) = &issue.pub_date {
                        let parts: Vec<String> = [&date.year, &date.month, &date.day]
                            .into_iter()
                            .map(text)
                            .filter(|p| !p.is_empty())
                            .collect();
                        builder = builder.publication_date(parts.join("-"));
                    }
                }
            }

            if let Some(abstract_node) = &details.article_abstract {
                if let Some(first) = abstract_node.texts.first() {
                    builder = builder.abstract_text(first.value.as_deref().unwrap_or("").trim());
                }
            }

            let doi = details
                .elocation_ids
                .iter()
                .find(|loc| loc.eid_type.as_deref() == Some("doi"))
                .map(|loc| loc.value.as_deref().unwrap_or("").trim().to_string())
                .unwrap_or_default();
            builder = builder.link(LinkKind::Doi, doi);

            let pmid = text(&citation.pmid);
            if !pmid.is_empty() {
                builder = builder.link(
                    LinkKind::Abstract,
                    format!("https://pubmed.ncbi.nlm.nih.gov/{}/", pmid),
                );
                builder = builder.link(LinkKind::Pmid, pmid);
            }

            let categories: Vec<String> = citation
                .mesh_heading_list
                .as_ref()
                .map(|list| {
                    list.headings
                        .iter()
                        .map(|h| text(&h.descriptor))
                        .filter(|t| !t.is_empty())
                        .collect()
                })
                .unwrap_or_default();
            builder = builder.categories(categories);

            papers.push(builder.build());
        }

        Ok(papers)
    }
}

impl Default for PubMedSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for PubMedSource {
    fn id(&self) -> &str {
        "pubmed"
    }

    fn name(&self) -> &str {
        "PubMed"
    }

    async fn collect(&self, query: &AuthorQuery) -> Result<Vec<Paper>, SourceError> {
        if !query.has_name() {
            tracing::debug!("no author name provided, skipping PubMed search");
            return Ok(Vec::new());
        }

        let mut all_papers = Vec::new();

        for strategy in Self::search_strategies(query) {
            let ids = match self.search_ids(&strategy).await {
                Ok(ids) => ids,
                Err(err) => {
                    tracing::warn!(%strategy, error = %err, "PubMed esearch failed");
                    continue;
                }
            };
            if ids.is_empty() {
                continue;
            }
            tracing::debug!(%strategy, count = ids.len(), "PubMed ids resolved");

            for batch in ids.chunks(self.search.pubmed_batch_size) {
                match self.fetch_batch(batch, query).await {
                    Ok(mut papers) => all_papers.append(&mut papers),
                    Err(err) => {
                        tracing::warn!(%strategy, error = %err, "PubMed efetch failed");
                    }
                }
                tokio::time::sleep(Duration::from_millis(self.search.pubmed_batch_delay_ms)).await;
            }
        }

        Ok(all_papers)
    }
}

// ===== E-utilities XML types =====

#[derive(Debug, Deserialize)]
struct ESearchResult {
    #[serde(rename = "IdList")]
    id_list: Option<IdList>,
}

#[derive(Debug, Deserialize)]
struct IdList {
    #[serde(rename = "Id", default)]
    ids: Vec<Text>,
}

#[derive(Debug, Deserialize)]
struct PubmedArticleSet {
    #[serde(rename = "PubmedArticle", default)]
    articles: Vec<PubmedArticle>,
}

#[derive(Debug, Deserialize)]
struct PubmedArticle {
    #[serde(rename = "MedlineCitation")]
    citation: Option<MedlineCitation>,
}

#[derive(Debug, Deserialize)]
struct MedlineCitation {
    #[serde(rename = "PMID")]
    pmid: Option<Text>,
    #[serde(rename = "Article")]
    article: Option<ArticleDetails>,
    #[serde(rename = "MeshHeadingList")]
    mesh_heading_list: Option<MeshHeadingList>,
}

#[derive(Debug, Deserialize)]
struct ArticleDetails {
    #[serde(rename = "ArticleTitle")]
    title: Option<Text>,
    #[serde(rename = "Journal")]
    journal: Option<Journal>,
    #[serde(rename = "Abstract")]
    article_abstract: Option<Abstract>,
    #[serde(rename = "AuthorList")]
    author_list: Option<AuthorList>,
    #[serde(rename = "ELocationID", default)]
    elocation_ids: Vec<ELocationId>,
}

#[derive(Debug, Deserialize)]
struct Journal {
    #[serde(rename = "Title")]
    title: Option<Text>,
    #[serde(rename = "JournalIssue")]
    issue: Option<JournalIssue>,
}

#[derive(Debug, Deserialize)]
struct JournalIssue {
    #[serde(rename = "PubDate")]
    pub_date: Option<PubDate>,
}

#[derive(Debug, Deserialize)]
struct PubDate {
    #[serde(rename = "Year")]
    year: Option<Text>,
    #[serde(rename = "Month")]
    month: Option<Text>,
    #[serde(rename = "Day")]
    day: Option<Text>,
}

#[derive(Debug, Deserialize)]
struct Abstract {
    #[serde(rename = "AbstractText", default)]
    texts: Vec<Text>,
}

#[derive(Debug, Deserialize)]
struct AuthorList {
    #[serde(rename = "Author", default)]
    authors: Vec<ArticleAuthor>,
}

#[derive(Debug, Deserialize)]
struct ArticleAuthor {
    #[serde(rename = "LastName")]
    last_name: Option<Text>,
    #[serde(rename = "ForeName")]
    fore_name: Option<Text>,
    #[serde(rename = "AffiliationInfo", default)]
    affiliations: Vec<AffiliationInfo>,
}

#[derive(Debug, Deserialize)]
struct AffiliationInfo {
    #[serde(rename = "Affiliation")]
    affiliation: Option<Text>,
}

#[derive(Debug, Deserialize)]
struct ELocationId {
    #[serde(rename = "@EIdType")]
    eid_type: Option<String>,
    #[serde(rename = "$text")]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MeshHeadingList {
    #[serde(rename = "MeshHeading", default)]
    headings: Vec<MeshHeading>,
}

#[derive(Debug, Deserialize)]
struct MeshHeading {
    #[serde(rename = "DescriptorName")]
    descriptor: Option<Text>,
}

#[derive(Debug, Default, Deserialize)]
struct Text {
    #[serde(rename = "$text", default)]
    value: Option<String>,
}

fn text(node: &Option<Text>) -> String {
    node.as_ref().map(text_of).unwrap_or_default()
}

fn text_of(node: &Text) -> String {
    node.value.as_deref().unwrap_or_default().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ESEARCH: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<eSearchResult>
  <Count>2</Count>
  <RetMax>2</RetMax>
  <IdList>
    <Id>12345678</Id>
    <Id>87654321</Id>
  </IdList>
</eSearchResult>"#;

    const EFETCH: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation>
      <PMID Version="1">12345678</PMID>
      <Article PubModel="Print">
        <Journal>
          <Title>Nature Medicine</Title>
          <JournalIssue>
            <PubDate>
              <Year>2021</Year>
              <Month>May</Month>
              <Day>3</Day>
            </PubDate>
          </JournalIssue>
        </Journal>
        <ArticleTitle>Deep learning in clinical practice</ArticleTitle>
        <Abstract>
          <AbstractText>We study deep learning models in the clinic.</AbstractText>
        </Abstract>
        <AuthorList>
          <Author>
            <LastName>Doe</LastName>
            <ForeName>Jane</ForeName>
            <AffiliationInfo>
              <Affiliation>Stanford University, CA, USA</Affiliation>
            </AffiliationInfo>
          </Author>
          <Author>
            <LastName>Smith</LastName>
            <ForeName>John</ForeName>
          </Author>
        </AuthorList>
        <ELocationID EIdType="pii" ValidYN="Y">S1234</ELocationID>
        <ELocationID EIdType="doi" ValidYN="Y">10.1038/s41591-021-0001</ELocationID>
      </Article>
      <MeshHeadingList>
        <MeshHeading>
          <DescriptorName UI="D000077321">Deep Learning</DescriptorName>
        </MeshHeading>
      </MeshHeadingList>
    </MedlineCitation>
  </PubmedArticle>
  <PubmedArticle>
    <MedlineCitation>
      <PMID Version="1">87654321</PMID>
      <Article PubModel="Print">
        <ArticleTitle>Unrelated article</ArticleTitle>
        <AuthorList>
          <Author>
            <LastName>Other</LastName>
            <ForeName>Someone</ForeName>
          </Author>
        </AuthorList>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
</PubmedArticleSet>"#;

    #[test]
    fn test_parse_id_list() {
        let ids = PubMedSource::parse_id_list(ESEARCH).unwrap();
        assert_eq!(ids, vec!["12345678", "87654321"]);
    }

    #[test]
    fn test_parse_id_list_empty() {
        let ids =
            PubMedSource::parse_id_list("<eSearchResult><Count>0</Count></eSearchResult>").unwrap();
        assert!(ids.is_empty());
    }

    #[test]
    fn test_parse_articles_filters_to_target_author() {
        let query = AuthorQuery::new("Jane Doe");
        let papers = PubMedSource::parse_articles(EFETCH, &query).unwrap();

        assert_eq!(papers.len(), 1);
        let paper = &papers[0];
        assert_eq!(paper.title, "Deep learning in clinical practice");
        assert_eq!(paper.journal, "Nature Medicine");
        assert_eq!(paper.publication_date, "2021-May-3");
        assert_eq!(paper.authors[0].name, "Jane Doe");
        assert_eq!(paper.authors[0].affiliation, "Stanford University, CA, USA");
        assert_eq!(paper.authors[1].affiliation, "");
        assert_eq!(paper.categories, vec!["Deep Learning"]);
    }

    #[test]
    fn test_parse_articles_extracts_links() {
        let query = AuthorQuery::new("Doe");
        let papers = PubMedSource::parse_articles(EFETCH, &query).unwrap();

        let links = &papers[0].links;
        assert_eq!(links.doi(), Some("10.1038/s41591-021-0001"));
        assert_eq!(links.get(LinkKind::Pmid), Some("12345678"));
        assert_eq!(
            links.get(LinkKind::Abstract),
            Some("https://pubmed.ncbi.nlm.nih.gov/12345678/")
        );
        // Abstracts only; PubMed gives no direct PDF
        assert_eq!(links.get(LinkKind::Pdf), None);
    }

    #[test]
    fn test_search_strategies() {
        let query = AuthorQuery::new("Jane Doe").school("Stanford University");
        let strategies = PubMedSource::search_strategies(&query);
        assert_eq!(strategies.len(), 4);
        assert_eq!(strategies[0], "\"Jane Doe\"[Author]");
        assert_eq!(strategies[1], "Jane Doe[Author]");
        // The quoted strategy quotes the school too, so multi-word
        // institutions stay a single phrase
        assert_eq!(
            strategies[2],
            "\"Jane Doe\"[Author] AND \"Stanford University\"[Affiliation]"
        );
        assert_eq!(
            strategies[3],
            "Jane Doe[Author] AND Stanford University[Affiliation]"
        );
    }

    #[tokio::test]
    async fn test_collect_with_mock_server() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Regex("/esearch".to_string()))
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(ESEARCH)
            .create_async()
            .await;
        server
            .mock("GET", mockito::Matcher::Regex("/efetch".to_string()))
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(EFETCH)
            .create_async()
            .await;

        let source = PubMedSource::new().with_base_url(server.url());
        let query = AuthorQuery::new("Jane Doe");
        let papers = source.collect(&query).await.unwrap();

        // Both strategies resolve the same ids and the same batch body
        assert_eq!(papers.len(), 2);
        assert!(papers.iter().all(|p| p.title == "Deep learning in clinical practice"));
    }
}
