//! Core data models for papers and collection queries.

mod paper;
mod query;

pub use paper::{Author, LinkKind, Links, Paper, PaperBuilder, NO_JOURNAL, NO_TITLE};
pub use query::AuthorQuery;
