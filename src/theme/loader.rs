//! Static asset loader - copies `static/` into the public directory

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Copies static files (CSS, JS, images) verbatim
pub struct AssetLoader {
    static_dir: PathBuf,
}

impl AssetLoader {
    pub fn new<P: AsRef<Path>>(static_dir: P) -> Self {
        Self {
            static_dir: static_dir.as_ref().to_path_buf(),
        }
    }

    /// Copy every static file to the public directory, returning the count
    ///
    /// A missing static directory is not an error. Files under directories
    /// starting with `_` or `.` are skipped.
    pub fn copy_to(&self, public_dir: &Path) -> Result<usize> {
        if !self.static_dir.is_dir() {
            return Ok(0);
        }

        let mut copied = 0;
        for entry in WalkDir::new(&self.static_dir)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| Error::SourceUnreadable {
                path: e.path().unwrap_or(&self.static_dir).to_path_buf(),
                source: e.into(),
            })?;

            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = path.strip_prefix(&self.static_dir).unwrap_or(path);
            let should_skip = relative.components().any(|c| {
                c.as_os_str()
                    .to_str()
                    .map(|s| s.starts_with('_') || s.starts_with('.'))
                    .unwrap_or(false)
            });
            if should_skip {
                continue;
            }

            let dest = public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).map_err(|source| Error::WriteArtifact {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            fs::copy(path, &dest).map_err(|source| Error::WriteArtifact {
                path: dest.clone(),
                source,
            })?;
            tracing::debug!("Copied: {:?} -> {:?}", path, dest);
            copied += 1;
        }

        Ok(copied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copies_assets_and_skips_hidden() {
        let dir = TempDir::new().unwrap();
        let static_dir = dir.path().join("static");
        fs::create_dir_all(static_dir.join("css")).unwrap();
        fs::create_dir_all(static_dir.join("_drafts")).unwrap();
        fs::write(static_dir.join("css/site.css"), "body {}").unwrap();
        fs::write(static_dir.join("favicon.ico"), [0u8, 1, 2]).unwrap();
        fs::write(static_dir.join("_drafts/wip.css"), "").unwrap();
        fs::write(static_dir.join(".DS_Store"), "").unwrap();

        let public = dir.path().join("public");
        let copied = AssetLoader::new(&static_dir).copy_to(&public).unwrap();

        assert_eq!(copied, 2);
        assert_eq!(
            fs::read_to_string(public.join("css/site.css")).unwrap(),
            "body {}"
        );
        assert_eq!(fs::read(public.join("favicon.ico")).unwrap(), vec![0, 1, 2]);
        assert!(!public.join("_drafts").exists());
        assert!(!public.join(".DS_Store").exists());
    }

    #[test]
    fn test_missing_static_dir() {
        let dir = TempDir::new().unwrap();
        let copied = AssetLoader::new(dir.path().join("static"))
            .copy_to(&dir.path().join("public"))
            .unwrap();
        assert_eq!(copied, 0);
    }
}
