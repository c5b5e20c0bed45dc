//! Build errors
//!
//! Only I/O and rendering failures end up here; they abort the build.
//! Documents with incomplete frontmatter are reported through
//! [`crate::content::MissingFrontmatter`] instead and never stop a build.

use std::io;
use std::path::PathBuf;

/// Fatal pipeline error
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The markdown source directory could not be walked
    #[error("failed to read source directory {path:?}: {source}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A markdown document exists but could not be read
    #[error("failed to read document {path:?}: {source}")]
    ReadDocument {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A generated artifact could not be written
    #[error("failed to write {path:?}: {source}")]
    WriteArtifact {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("failed to serialize listing: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
