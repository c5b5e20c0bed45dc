//! Clean the public directory

use anyhow::{Context, Result};
use std::fs;

use crate::Blog;

/// Delete the public directory
pub fn run(blog: &Blog) -> Result<()> {
    if blog.public_dir.exists() {
        fs::remove_dir_all(&blog.public_dir)
            .with_context(|| format!("deleting {}", blog.public_dir.display()))?;
        tracing::info!("Deleted: {:?}", blog.public_dir);
    }

    Ok(())
}
