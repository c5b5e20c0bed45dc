//! Content loader - loads markdown documents from the source directory

use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use super::{extract_entries, BlogEntry, MarkdownDocument};
use crate::error::{Error, Result};
use crate::Blog;

/// Loads content from the source directory
pub struct ContentLoader<'a> {
    blog: &'a Blog,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(blog: &'a Blog) -> Self {
        Self { blog }
    }

    /// Load every markdown document under the source directory
    ///
    /// Documents come back ordered by path so that repeated builds see the
    /// same input order. Any I/O failure aborts the load.
    pub fn load_documents(&self) -> Result<Vec<MarkdownDocument>> {
        let source_dir = &self.blog.source_dir;
        let excluded = self.blog.config.exclude_patterns();

        if !source_dir.is_dir() {
            return Err(Error::SourceUnreadable {
                path: source_dir.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "source directory does not exist",
                ),
            });
        }

        let mut documents = Vec::new();

        for entry in WalkDir::new(source_dir)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| Error::SourceUnreadable {
                path: e.path().unwrap_or(source_dir).to_path_buf(),
                source: e.into(),
            })?;

            let path = entry.path();
            if !entry.file_type().is_file() || !is_markdown_file(path) {
                continue;
            }

            let relative = path.strip_prefix(source_dir).unwrap_or(path);
            if excluded.iter().any(|p| p.matches_path(relative)) {
                tracing::debug!("Excluded: {:?}", relative);
                continue;
            }

            documents.push(self.load_document(path, relative)?);
        }

        Ok(documents)
    }

    /// Load documents and extract their listing entries
    pub fn load_entries(&self) -> Result<(Vec<MarkdownDocument>, Vec<BlogEntry>)> {
        let documents = self.load_documents()?;
        let entries = extract_entries(&documents);
        Ok((documents, entries))
    }

    /// Load a single document from a file
    fn load_document(&self, path: &Path, relative: &Path) -> Result<MarkdownDocument> {
        let content = fs::read_to_string(path).map_err(|source| Error::ReadDocument {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(MarkdownDocument::parse(
            path,
            relative,
            &content,
            &self.blog.config.root,
        ))
    }
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}
