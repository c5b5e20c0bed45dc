//! Blog entries: the validated listing metadata of a post

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::MarkdownDocument;

/// Front-matter keys every listed post must declare with exactly one value
pub const REQUIRED_FIELDS: [&str; 5] = ["title", "description", "author", "date", "category"];

/// One post as it appears in listings
///
/// Field order is the order an article summary displays them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogEntry {
    pub route: String,
    pub author: String,
    /// Sortable date string, compared lexically
    pub date: String,
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A document left out of the listings
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "Not adding {file_path:?} into the listing as it is missing required frontmatter fields (one of [title, description, author, date, category])"
)]
pub struct MissingFrontmatter {
    pub file_path: PathBuf,
    /// Required keys that were absent or not single-valued
    pub missing: Vec<&'static str>,
}

impl BlogEntry {
    /// Validate a document's front-matter into an entry
    pub fn from_document(doc: &MarkdownDocument) -> Result<Self, MissingFrontmatter> {
        let fm = &doc.front_matter;

        let missing: Vec<&'static str> = REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|key| fm.single(key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(MissingFrontmatter {
                file_path: doc.file_path.clone(),
                missing,
            });
        }

        let field = |key: &str| fm.single(key).unwrap_or_default().to_string();

        Ok(Self {
            route: doc.route.clone(),
            author: field("author"),
            date: field("date"),
            title: field("title"),
            description: field("description"),
            category: field("category"),
            updated: fm.single("updated").map(str::to_string),
            tags: fm.list("tags"),
        })
    }
}

/// Build listing entries from documents, in input order
///
/// Documents missing required front-matter are logged and skipped.
pub fn extract_entries(documents: &[MarkdownDocument]) -> Vec<BlogEntry> {
    documents
        .iter()
        .filter_map(|doc| match BlogEntry::from_document(doc) {
            Ok(entry) => Some(entry),
            Err(skipped) => {
                tracing::info!("{}", skipped);
                None
            }
        })
        .collect()
}
