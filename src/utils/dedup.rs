//! Deduplication and merging of papers across sources.
//!
//! Records are grouped by identity key: the DOI when present (lower-cased,
//! trimmed), else the normalized title, else a no-identity bucket that
//! passes through unmerged. A record with a DOI is never reconsidered for
//! title grouping, even when its title also matches another group.
//!
//! Each group of two or more records is folded left to right into one
//! record with an asymmetric "first non-empty wins" policy. Source order
//! (arXiv, PubMed, DOAJ, Zenodo, Crossref) therefore acts as an implicit
//! priority: the engine never judges data quality beyond "non-empty beats
//! empty".

use std::collections::{HashMap, HashSet};

use crate::models::Paper;

/// Identity key used to group candidate-duplicate records
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum IdentityKey {
    Doi(String),
    Title(String),
    None,
}

fn identity_key(paper: &Paper) -> IdentityKey {
    if let Some(doi) = paper.doi() {
        let doi = doi.trim().to_lowercase();
        if !doi.is_empty() {
            return IdentityKey::Doi(doi);
        }
    }

    if paper.has_title() {
        return IdentityKey::Title(paper.title.trim().to_lowercase());
    }

    IdentityKey::None
}

/// Deduplicate a concatenated list of papers from all sources.
///
/// Output order is deterministic: merged DOI groups in first-seen order,
/// then merged title groups in first-seen order, then records with no
/// identity, unchanged.
pub fn deduplicate_papers(papers: Vec<Paper>) -> Vec<Paper> {
    if papers.is_empty() {
        return papers;
    }

    let mut doi_groups: HashMap<String, Vec<Paper>> = HashMap::new();
    let mut doi_order: Vec<String> = Vec::new();
    let mut title_groups: HashMap<String, Vec<Paper>> = HashMap::new();
    let mut title_order: Vec<String> = Vec::new();
    let mut no_identity: Vec<Paper> = Vec::new();

    for paper in papers {
        match identity_key(&paper) {
            IdentityKey::Doi(doi) => {
                doi_groups
                    .entry(doi.clone())
                    .or_insert_with(|| {
                        doi_order.push(doi);
                        Vec::new()
                    })
                    .push(paper);
            }
            IdentityKey::Title(title) => {
                title_groups
                    .entry(title.clone())
                    .or_insert_with(|| {
                        title_order.push(title);
                        Vec::new()
                    })
                    .push(paper);
            }
            IdentityKey::None => no_identity.push(paper),
        }
    }

    let mut unique = Vec::new();

    for doi in doi_order {
        let group = doi_groups.remove(&doi).unwrap_or_default();
        if let Some(merged) = merge_group(group) {
            unique.push(merged);
        }
    }

    for title in title_order {
        let group = title_groups.remove(&title).unwrap_or_default();
        if let Some(merged) = merge_group(group) {
            unique.push(merged);
        }
    }

    // Records with neither DOI nor title are never merged with anything
    unique.extend(no_identity);

    unique
}

/// Fold a group of same-identity records into one, first record as seed.
fn merge_group(group: Vec<Paper>) -> Option<Paper> {
    let mut papers = group.into_iter();
    let mut merged = papers.next()?;

    for paper in papers {
        merge_into(&mut merged, paper);
    }

    Some(merged)
}

fn merge_into(merged: &mut Paper, paper: Paper) {
    // Authors: case-folded name dedups; first-seen entry keeps its position;
    // a later non-empty affiliation backfills an empty one
    let mut seen: HashMap<String, usize> = merged
        .authors
        .iter()
        .enumerate()
        .map(|(idx, author)| (author.name.to_lowercase(), idx))
        .collect();

    for author in paper.authors {
        let key = author.name.to_lowercase();
        match seen.get(&key) {
            Some(&idx) => {
                let existing = &mut merged.authors[idx];
                if existing.affiliation.is_empty() && !author.affiliation.is_empty() {
                    existing.affiliation = author.affiliation;
                }
            }
            None => {
                seen.insert(key, merged.authors.len());
                merged.authors.push(author);
            }
        }
    }

    // Links: per-kind first non-empty value wins
    for (kind, value) in paper.links.iter() {
        if !merged.links.contains(kind) {
            merged.links.insert(kind, value);
        }
    }

    // Categories: case-folded set union keeping first-seen casing and order
    let mut seen_categories: HashSet<String> = merged
        .categories
        .iter()
        .map(|c| c.to_lowercase())
        .collect();

    for category in paper.categories {
        if seen_categories.insert(category.to_lowercase()) {
            merged.categories.push(category);
        }
    }

    // Scalar fields: first non-empty wins
    if merged.title.is_empty() && !paper.title.is_empty() {
        merged.title = paper.title;
    }
    if merged.journal.is_empty() && !paper.journal.is_empty() {
        merged.journal = paper.journal;
    }
    if merged.r#abstract.is_empty() && !paper.r#abstract.is_empty() {
        merged.r#abstract = paper.r#abstract;
    }
    if merged.publication_date.is_empty() && !paper.publication_date.is_empty() {
        merged.publication_date = paper.publication_date;
    }
}
