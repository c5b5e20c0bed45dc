//! Generator module - writes listing data and renders pages with the
//! built-in Tera templates

use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use tera::Context;

use crate::content::{BlogEntry, MarkdownDocument, MarkdownRenderer};
use crate::error::{Error, Result};
use crate::helpers::{encode_path, full_url_for};
use crate::listing::{generate_listings, Listing, ListingSet};
use crate::templates::{ArticleData, SiteData, TemplateRenderer};
use crate::theme::{AssetLoader, Theme};
use crate::Blog;

/// Static site generator using Tera templates
pub struct Generator {
    blog: Blog,
    renderer: TemplateRenderer,
    markdown: MarkdownRenderer,
    site: SiteData,
    theme: Theme,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog) -> Result<Self> {
        let config = &blog.config;
        let renderer = TemplateRenderer::new(&config.date_format)?;
        let markdown =
            MarkdownRenderer::with_options(&config.highlight.theme, config.highlight.line_number);

        Ok(Self {
            blog: blog.clone(),
            renderer,
            markdown,
            site: SiteData::from_config(config),
            theme: Theme::from_config(config),
        })
    }

    /// Generate the entire site
    ///
    /// Articles are rendered before listings, so a listing page wins over
    /// an article that maps to the same path. Category pages and data files
    /// left by an earlier build for a category that no longer exists are
    /// removed.
    pub fn generate(
        &self,
        documents: &[MarkdownDocument],
        entries: &[BlogEntry],
    ) -> Result<ListingSet> {
        let public_dir = &self.blog.public_dir;
        fs::create_dir_all(public_dir).map_err(|source| Error::WriteArtifact {
            path: public_dir.clone(),
            source,
        })?;

        let copied = AssetLoader::new(&self.blog.static_dir).copy_to(public_dir)?;
        if copied > 0 {
            tracing::info!("Copied {} static files", copied);
        }

        let listings = generate_listings(entries, &self.blog.config);
        let previous = self.previous_category_paths();
        let mut pages = HashSet::new();

        self.generate_article_pages(documents, &mut pages)?;
        self.write_listing_data(&listings)?;
        self.generate_listing_pages(&listings, &mut pages)?;
        self.remove_stale_pages(&previous, &pages)?;

        Ok(listings)
    }

    /// Directory holding the serialized listings
    pub fn data_dir(&self) -> PathBuf {
        self.blog
            .public_dir
            .join(self.blog.config.data_dir.trim_matches('/'))
            .join("blog")
    }

    /// Create a base context with common variables
    ///
    /// `page_path` is the page's output path relative to the public
    /// directory; it becomes the canonical URL.
    fn create_base_context(
        &self,
        page_title: &str,
        current_path: &str,
        page_path: &str,
    ) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.site);
        context.insert("theme", &self.theme);
        context.insert("page_title", page_title);
        context.insert("page_description", &self.site.description);
        context.insert("current_path", current_path);
        context.insert(
            "canonical_url",
            &full_url_for(&self.blog.config, &encode_path(page_path)),
        );
        context
    }

    /// Output paths of the category listings written by the previous build,
    /// read back from their data files
    fn previous_category_paths(&self) -> Vec<String> {
        let Ok(files) = fs::read_dir(self.data_dir().join("categories")) else {
            return Vec::new();
        };

        files
            .filter_map(|file| file.ok())
            .filter(|file| file.path().extension().is_some_and(|ext| ext == "json"))
            .filter_map(|file| fs::read_to_string(file.path()).ok())
            .filter_map(|json| serde_json::from_str::<Listing>(&json).ok())
            .map(|listing| listing.path)
            .collect()
    }

    /// Delete category pages of the previous build that nothing in this
    /// build wrote
    fn remove_stale_pages(&self, previous: &[String], pages: &HashSet<PathBuf>) -> Result<()> {
        for path in previous {
            if !is_safe_relative(path) || path.trim_matches('/').is_empty() {
                continue;
            }
            let output_path = self.page_output_path(path);
            if pages.contains(&output_path) || !output_path.is_file() {
                continue;
            }

            fs::remove_file(&output_path).map_err(|source| Error::WriteArtifact {
                path: output_path.clone(),
                source,
            })?;
            // Only succeeds when the directory held nothing else
            if let Some(dir) = output_path.parent() {
                let _ = fs::remove_dir(dir);
            }
            tracing::info!("Removed stale category page {:?}", output_path);
        }
        Ok(())
    }

    /// Write the "all posts" listing and one file per category as JSON
    ///
    /// The category directory is rebuilt from scratch so it holds exactly
    /// the categories of this build.
    fn write_listing_data(&self, listings: &ListingSet) -> Result<()> {
        let data_dir = self.data_dir();

        let categories_dir = data_dir.join("categories");
        if categories_dir.exists() {
            fs::remove_dir_all(&categories_dir).map_err(|source| Error::WriteArtifact {
                path: categories_dir.clone(),
                source,
            })?;
        }

        let output_path = data_dir.join("index.json");
        write_json(&output_path, &listings.all)?;
        tracing::info!("Generated blog listing data at {:?}", output_path);

        for listing in listings.categories.values() {
            let output_path = data_dir
                .join("categories")
                .join(format!("{}.json", listing.path.trim_end_matches('/')));
            write_json(&output_path, listing)?;
            tracing::info!(
                "Generated category data for '{}' at {:?}",
                listing.category.as_deref().unwrap_or_default(),
                output_path
            );
        }

        Ok(())
    }

    /// Render the "all posts" page and one page per category
    fn generate_listing_pages(
        &self,
        listings: &ListingSet,
        pages: &mut HashSet<PathBuf>,
    ) -> Result<()> {
        let output_path = self.render_listing(&listings.all, pages)?;
        tracing::info!("Generated blog listing index at {:?}", output_path);

        for listing in listings.categories.values() {
            let output_path = self.render_listing(listing, pages)?;
            tracing::info!(
                "Generated category page for '{}' at {:?}",
                listing.category.as_deref().unwrap_or_default(),
                output_path
            );
        }

        Ok(())
    }

    fn render_listing(&self, listing: &Listing, pages: &mut HashSet<PathBuf>) -> Result<PathBuf> {
        let mut context = self.create_base_context(&listing.title, &listing.route, &listing.path);
        context.insert("listing", listing);

        let html = self.renderer.render("listing.html", &context)?;

        let output_path = self.page_output_path(&listing.path);
        claim_page(pages, &output_path);
        write_artifact(&output_path, html.as_bytes())?;
        Ok(output_path)
    }

    /// Render one page per markdown document
    fn generate_article_pages(
        &self,
        documents: &[MarkdownDocument],
        pages: &mut HashSet<PathBuf>,
    ) -> Result<()> {
        let mut count = 0;

        for doc in documents {
            if !is_safe_relative(&doc.path) {
                tracing::warn!(
                    "Not rendering {:?}: its route {:?} leaves the public directory",
                    doc.file_path,
                    doc.route
                );
                continue;
            }

            let rendered = self.markdown.render(&doc.body);
            let entry = BlogEntry::from_document(doc).ok();
            let title = doc
                .front_matter
                .single("title")
                .unwrap_or_default()
                .to_string();

            let article = ArticleData {
                title: title.clone(),
                route: doc.route.clone(),
                content: rendered.html,
                headings: rendered.headings,
            };

            let page_title = if title.is_empty() {
                &self.site.title
            } else {
                &title
            };
            let mut context = self.create_base_context(page_title, &doc.route, &doc.path);
            context.insert("article", &article);
            if let Some(entry) = &entry {
                context.insert("page_description", &entry.description);
                context.insert("entry", entry);
            }

            let html = self.renderer.render("article.html", &context)?;

            let output_path = self.page_output_path(&doc.path);
            claim_page(pages, &output_path);
            write_artifact(&output_path, html.as_bytes())?;
            tracing::debug!("Generated article: {:?}", output_path);
            count += 1;
        }

        tracing::info!("Generated {} article pages", count);
        Ok(())
    }

    /// `<public>/<path>/index.html`
    fn page_output_path(&self, path: &str) -> PathBuf {
        // Strip slashes to avoid creating absolute paths
        let clean_path = path.trim_matches('/');
        if clean_path.is_empty() {
            self.blog.public_dir.join("index.html")
        } else {
            self.blog.public_dir.join(clean_path).join("index.html")
        }
    }
}

/// Record a page written in this build, warning when one replaces another
fn claim_page(pages: &mut HashSet<PathBuf>, output_path: &Path) {
    if !pages.insert(output_path.to_path_buf()) {
        tracing::warn!(
            "{:?} overwrites a page generated earlier in this build",
            output_path
        );
    }
}

/// A public-relative path that stays inside the public directory
fn is_safe_relative(path: &str) -> bool {
    Path::new(path.trim_start_matches('/'))
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    write_artifact(path, json.as_bytes())
}

/// Write a file, creating its parent directories
fn write_artifact(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| Error::WriteArtifact {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, contents).map_err(|source| Error::WriteArtifact {
        path: path.to_path_buf(),
        source,
    })
}
