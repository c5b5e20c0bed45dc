//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub source_dir: String,
    pub public_dir: String,
    /// Route segment of the "all posts" listing
    pub blog_dir: String,
    /// Directory (inside public_dir) holding the serialized listings
    pub data_dir: String,
    /// Glob patterns, relative to source_dir, of markdown files to ignore
    #[serde(default)]
    pub exclude: Vec<String>,

    // Listings
    pub listing_title: String,
    /// Moment.js-style format used to display entry dates
    pub date_format: String,

    // Writing
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Layout
    /// Navigation links, in display order (name -> path)
    #[serde(default)]
    pub menu: IndexMap<String, String>,
    #[serde(default)]
    pub theme: ThemeConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        let mut menu = IndexMap::new();
        menu.insert("Last posts".to_string(), "/blog/".to_string());

        Self {
            title: "K-Droid Dev".to_string(),
            description: "Tech chatter, tutorials, and career advice".to_string(),
            author: "John Doe".to_string(),
            language: "en".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            source_dir: "markdown".to_string(),
            public_dir: "public".to_string(),
            blog_dir: "blog".to_string(),
            data_dir: "_data".to_string(),
            exclude: Vec::new(),

            listing_title: "Blog Posts".to_string(),
            date_format: "MMMM D, YYYY".to_string(),

            highlight: HighlightConfig::default(),

            menu,
            theme: ThemeConfig::default(),

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Compiled `exclude` patterns; invalid patterns are logged and dropped
    pub fn exclude_patterns(&self) -> Vec<glob::Pattern> {
        self.exclude
            .iter()
            .filter_map(|p| match glob::Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    tracing::warn!("Ignoring invalid exclude pattern {:?}: {}", p, e);
                    None
                }
            })
            .collect()
    }
}

/// Code block highlighting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// syntect theme name
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

/// Initial color mode of rendered pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Light,
    Dark,
}

impl ColorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorMode::Light => "light",
            ColorMode::Dark => "dark",
        }
    }
}

/// Colors for one color mode
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub background: String,
    pub color: String,
    pub brand: String,
    pub border: String,
}

impl Palette {
    fn light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            color: "#000000".to_string(),
            brand: "#3c83ef".to_string(),
            border: "#d0d7de".to_string(),
        }
    }

    fn dark() -> Self {
        Self {
            background: "#0d1117".to_string(),
            color: "#ffffff".to_string(),
            brand: "#58a6ff".to_string(),
            border: "#30363d".to_string(),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::light()
    }
}

/// Both palettes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Palettes {
    pub light: Palette,
    pub dark: Palette,
}

impl Default for Palettes {
    fn default() -> Self {
        Self {
            light: Palette::light(),
            dark: Palette::dark(),
        }
    }
}

/// Page styling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Prefix of every generated CSS class name
    pub css_prefix: String,
    pub color_mode: ColorMode,
    pub palette: Palettes,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            css_prefix: "bs".to_string(),
            color_mode: ColorMode::default(),
            palette: Palettes::default(),
        }
    }
}
