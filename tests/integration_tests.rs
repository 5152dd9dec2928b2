//! Integration tests for Paper Collector
//!
//! These tests verify the full collection pipeline over mock sources:
//! fan-out, fault isolation, and cross-source deduplication and merging.

use paper_collector::models::{AuthorQuery, LinkKind, PaperBuilder};
use paper_collector::sources::mock::MockSource;
use paper_collector::PaperCollector;
use std::sync::Arc;

fn expected_source_count() -> usize {
    let mut count = 0;

    if cfg!(feature = "source-arxiv") {
        count += 1;
    }
    if cfg!(feature = "source-pubmed") {
        count += 1;
    }
    if cfg!(feature = "source-doaj") {
        count += 1;
    }
    if cfg!(feature = "source-zenodo") {
        count += 1;
    }
    if cfg!(feature = "source-crossref") {
        count += 1;
    }

    count
}

#[test]
fn test_collector_registers_enabled_sources() {
    let collector = PaperCollector::new();
    assert_eq!(collector.sources().len(), expected_source_count());
}

#[tokio::test]
async fn test_empty_name_makes_no_source_calls() {
    let first = Arc::new(MockSource::new());
    let second = Arc::new(MockSource::new());
    let collector = PaperCollector::with_sources(vec![first.clone(), second.clone()]);

    let papers = collector.get_papers(&AuthorQuery::new("")).await;

    assert!(papers.is_empty());
    assert_eq!(first.call_count(), 0);
    assert_eq!(second.call_count(), 0);
}

#[tokio::test]
async fn test_failing_source_does_not_poison_collection() {
    let preprint = PaperBuilder::new()
        .title("Attention Is All You Need")
        .author("Ashish Vaswani", "")
        .journal("arXiv")
        .link(LinkKind::Doi, "10.48550/arXiv.1706.03762")
        .build();

    let good = Arc::new(MockSource::with_papers(vec![preprint]));
    let bad = Arc::new(MockSource::failing("connection refused"));
    let collector = PaperCollector::with_sources(vec![good.clone(), bad.clone()]);

    let papers = collector.get_papers(&AuthorQuery::new("Vaswani")).await;

    assert_eq!(papers.len(), 1);
    assert_eq!(good.call_count(), 1);
    assert_eq!(bad.call_count(), 1);
}

/// The same paper reported by two sources merges into a single record:
/// the first occurrence wins for scalars and links, later occurrences
/// backfill affiliations and extend categories.
#[tokio::test]
async fn test_cross_source_merge_by_doi() {
    let from_preprint_server = PaperBuilder::new()
        .title("Deep learning in clinical practice")
        .author("Jane Doe", "")
        .publication_date("2021-05-03T00:00:00Z")
        .journal("arXiv")
        .categories(vec!["cs.LG".to_string()])
        .link(LinkKind::Doi, "10.1038/S41591-021-0001")
        .link(LinkKind::Pdf, "https://arxiv.org/pdf/2105.00001")
        .build();

    let from_index = PaperBuilder::new()
        .title("Deep Learning in Clinical Practice")
        .author("Jane Doe", "Stanford University")
        .author("John Smith", "MIT")
        .publication_date("2021-May-3")
        .journal("Nature Medicine")
        .abstract_text("We study deep learning models in the clinic.")
        .categories(vec!["CS.LG".to_string(), "Deep Learning".to_string()])
        .link(LinkKind::Doi, "10.1038/s41591-021-0001")
        .link(LinkKind::Pmid, "12345678")
        .build();

    let a = Arc::new(MockSource::with_papers(vec![from_preprint_server]));
    let b = Arc::new(MockSource::with_papers(vec![from_index]));
    let collector = PaperCollector::with_sources(vec![a, b]);

    let papers = collector.get_papers(&AuthorQuery::new("Jane Doe")).await;

    assert_eq!(papers.len(), 1);
    let merged = &papers[0];

    // First-seen scalars win, later sources fill the gaps
    assert_eq!(merged.title, "Deep learning in clinical practice");
    assert_eq!(merged.journal, "arXiv");
    assert_eq!(merged.publication_date, "2021-05-03T00:00:00Z");
    assert_eq!(merged.r#abstract, "We study deep learning models in the clinic.");

    // Jane's affiliation is backfilled, John is appended
    assert_eq!(merged.authors.len(), 2);
    assert_eq!(merged.authors[0].affiliation, "Stanford University");
    assert_eq!(merged.authors[1].name, "John Smith");

    // Links union with first-wins per kind
    assert_eq!(merged.doi(), Some("10.1038/S41591-021-0001"));
    assert_eq!(
        merged.links.get(LinkKind::Pdf),
        Some("https://arxiv.org/pdf/2105.00001")
    );
    assert_eq!(merged.links.get(LinkKind::Pmid), Some("12345678"));

    // Categories deduplicate case-insensitively, first casing kept
    assert_eq!(merged.categories, vec!["cs.LG", "Deep Learning"]);
}

#[tokio::test]
async fn test_cross_source_merge_by_title_without_doi() {
    let a = Arc::new(MockSource::with_papers(vec![PaperBuilder::new()
        .title("Untracked workshop paper")
        .author("Jane Doe", "")
        .build()]));
    let b = Arc::new(MockSource::with_papers(vec![PaperBuilder::new()
        .title("UNTRACKED WORKSHOP PAPER")
        .author("Jane Doe", "Stanford University")
        .journal("Workshop Proceedings")
        .build()]));
    let collector = PaperCollector::with_sources(vec![a, b]);

    let papers = collector.get_papers(&AuthorQuery::new("Jane Doe")).await;

    assert_eq!(papers.len(), 1);
    assert_eq!(papers[0].title, "Untracked workshop paper");
    assert_eq!(papers[0].journal, "Workshop Proceedings");
    assert_eq!(papers[0].authors[0].affiliation, "Stanford University");
}

/// Records with neither a DOI nor a usable title never merge with each
/// other; they pass through unchanged.
#[tokio::test]
async fn test_untitled_records_pass_through() {
    let a = Arc::new(MockSource::with_papers(vec![
        PaperBuilder::new().title("No title").journal("A").author("Jane Doe", "").build(),
        PaperBuilder::new().title("No title").journal("B").author("Jane Doe", "").build(),
    ]));
    let collector = PaperCollector::with_sources(vec![a]);

    let papers = collector.get_papers(&AuthorQuery::new("Jane Doe")).await;

    assert_eq!(papers.len(), 2);
}

/// Output ordering: DOI-keyed groups first in first-seen order, then
/// title-keyed groups, then records without identity.
#[tokio::test]
async fn test_output_ordering_is_deterministic() {
    let a = Arc::new(MockSource::with_papers(vec![
        PaperBuilder::new().title("Only a title").author("Jane Doe", "").build(),
        PaperBuilder::new()
            .title("Second DOI paper")
            .author("Jane Doe", "")
            .link(LinkKind::Doi, "10.1/b")
            .build(),
        PaperBuilder::new().title("No title").author("Jane Doe", "").build(),
        PaperBuilder::new()
            .title("First DOI paper")
            .author("Jane Doe", "")
            .link(LinkKind::Doi, "10.1/a")
            .build(),
    ]));
    let collector = PaperCollector::with_sources(vec![a]);

    let papers = collector.get_papers(&AuthorQuery::new("Jane Doe")).await;

    let titles: Vec<&str> = papers.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Second DOI paper",
            "First DOI paper",
            "Only a title",
            "No title",
        ]
    );
}
