//! Markdown documents and their routes

use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Component, Path, PathBuf};

use super::FrontMatter;

/// Front-matter key that replaces the file-derived route
pub const ROUTE_OVERRIDE_KEY: &str = "routeOverride";

lazy_static! {
    static ref ACRONYM_BOUNDARY: Regex = Regex::new(r"([A-Z]+)([A-Z][a-z])").unwrap();
    static ref WORD_BOUNDARY: Regex = Regex::new(r"([a-z0-9])([A-Z])").unwrap();
}

/// A markdown file read from the source directory
#[derive(Debug, Clone)]
pub struct MarkdownDocument {
    /// Full source file path
    pub file_path: PathBuf,

    /// Output path relative to the public directory, without leading slash
    /// ("" for the site root)
    pub path: String,

    /// URL of the rendered page
    pub route: String,

    pub front_matter: FrontMatter,

    /// Markdown after the front-matter block
    pub body: String,
}

impl MarkdownDocument {
    /// A document with a known route and no body
    pub fn new(
        file_path: impl Into<PathBuf>,
        route: impl Into<String>,
        front_matter: FrontMatter,
    ) -> Self {
        let route = route.into();
        Self {
            file_path: file_path.into(),
            path: route.trim_matches('/').to_string(),
            route,
            front_matter,
            body: String::new(),
        }
    }

    /// Parse a document from its content
    ///
    /// `relative` is the file path relative to the source directory and
    /// `root` the site root URL path.
    pub fn parse(file_path: &Path, relative: &Path, content: &str, root: &str) -> Self {
        let (front_matter, body) = FrontMatter::parse(content);

        let derived = route_path(relative);
        let path = match front_matter.single(ROUTE_OVERRIDE_KEY) {
            Some(route_override) => apply_route_override(&derived, route_override),
            None => derived,
        };
        let route = route_for(root, &path);

        Self {
            file_path: file_path.to_path_buf(),
            path,
            route,
            body: body.to_string(),
            front_matter,
        }
    }
}

/// Root-relative route of a markdown file
///
/// Directory names are lower-cased, the file stem is converted from
/// CamelCase to kebab-case, and `index` files map to their directory,
/// which keeps a trailing slash.
///
/// `blog/2024/MyFirstPost.md` -> `blog/2024/my-first-post`
/// `blog/Index.md` -> `blog/`
pub fn route_path(relative: &Path) -> String {
    let mut segments: Vec<String> = relative
        .parent()
        .into_iter()
        .flat_map(Path::components)
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().to_lowercase()),
            _ => None,
        })
        .collect();

    let stem = relative
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    if stem.eq_ignore_ascii_case("index") {
        if segments.is_empty() {
            return String::new();
        }
        return format!("{}/", segments.join("/"));
    }

    segments.push(kebab_case(&stem));
    segments.join("/")
}

/// `routeOverride` handling: an absolute override replaces the whole
/// route, a relative one replaces the last segment
pub fn apply_route_override(derived: &str, route_override: &str) -> String {
    if let Some(absolute) = route_override.strip_prefix('/') {
        return absolute.to_string();
    }
    match derived.trim_end_matches('/').rsplit_once('/') {
        Some((parent, _)) => format!("{}/{}", parent, route_override),
        None => route_override.to_string(),
    }
}

/// Join the site root and a root-relative path
pub fn route_for(root: &str, path: &str) -> String {
    format!("{}/{}", root.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// `MyFirstPost` -> `my-first-post`, `HTTPServer` -> `http-server`
pub fn kebab_case(name: &str) -> String {
    let name = ACRONYM_BOUNDARY.replace_all(name, "$1-$2");
    let name = WORD_BOUNDARY.replace_all(&name, "$1-$2");
    name.replace(['_', ' '], "-").to_lowercase()
}
