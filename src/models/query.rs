//! Query model for author-centric paper collection.

use serde::{Deserialize, Serialize};

/// Query parameters for collecting a researcher's publication record.
///
/// `name` is required for any source to return results; an empty or
/// whitespace-only name short-circuits collection before any remote call.
/// `school` is optional and used both as an extra search-phrasing variant
/// and as an affiliation filter on sources that report affiliations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorQuery {
    /// Target author's name, e.g. "Jane Doe"
    pub name: String,

    /// Target institution, e.g. "MIT"
    pub school: Option<String>,
}

impl AuthorQuery {
    /// Create a new query for an author name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            school: None,
        }
    }

    /// Set the institution filter
    pub fn school(mut self, school: impl Into<String>) -> Self {
        self.school = Some(school.into());
        self
    }

    /// Whether a usable author name was supplied
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// The institution filter, if a non-empty one was supplied
    pub fn school_filter(&self) -> Option<&str> {
        self.school
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_name() {
        assert!(AuthorQuery::new("Jane Doe").has_name());
        assert!(!AuthorQuery::new("").has_name());
        assert!(!AuthorQuery::new("   ").has_name());
    }

    #[test]
    fn test_school_filter() {
        let query = AuthorQuery::new("Jane Doe").school("MIT");
        assert_eq!(query.school_filter(), Some("MIT"));

        let query = AuthorQuery::new("Jane Doe").school("  ");
        assert_eq!(query.school_filter(), None);

        let query = AuthorQuery::new("Jane Doe");
        assert_eq!(query.school_filter(), None);
    }
}
