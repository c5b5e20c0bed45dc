//! kdroid-blog: a markdown blog generator
//!
//! Markdown documents with YAML frontmatter are turned into blog entries,
//! grouped into listings (all posts and one per category), written out as
//! JSON data and rendered to HTML pages with Tera templates.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod listing;
pub mod server;
pub mod templates;
pub mod theme;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// A blog site rooted at a base directory
#[derive(Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Markdown source directory
    pub source_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Static assets copied verbatim into the public directory
    pub static_dir: PathBuf,
}

impl Blog {
    /// Open a site, reading `_config.yml` when it exists
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Open a site with an already loaded configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let source_dir = base_dir.join(&config.source_dir);
        let public_dir = base_dir.join(&config.public_dir);
        let static_dir = base_dir.join("static");

        Self {
            config,
            base_dir,
            source_dir,
            public_dir,
            static_dir,
        }
    }

    /// Generate the static site
    pub fn generate(&self) -> Result<()> {
        commands::generate::run(self)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Create a new post
    pub fn new_post(&self, title: &str, category: Option<&str>) -> Result<PathBuf> {
        commands::new::create_post(self, title, category, None)
    }
}
