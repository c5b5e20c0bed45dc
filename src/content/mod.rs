//! Content module - markdown documents, front-matter and listing entries

mod document;
mod entry;
mod frontmatter;
pub mod loader;
mod markdown;

pub use document::{kebab_case, route_for, route_path, MarkdownDocument, ROUTE_OVERRIDE_KEY};
pub use entry::{extract_entries, BlogEntry, MissingFrontmatter, REQUIRED_FIELDS};
pub use frontmatter::FrontMatter;
pub use markdown::{Heading, MarkdownRenderer, RenderedMarkdown};
