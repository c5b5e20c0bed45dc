//! Listings - the "all posts" listing and one listing per category
//!
//! Listings are plain data: the generator serializes them to JSON and
//! hands them to the templates as typed values.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::SiteConfig;
use crate::content::{route_for, BlogEntry};
use crate::helpers::encode_path;

/// An ordered collection of entries rendered as one page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// Page heading
    pub title: String,
    /// URL of the listing page
    pub route: String,
    /// Output path relative to the public directory
    pub path: String,
    /// Category shared by every entry, for category listings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Entries, newest first
    pub entries: Vec<BlogEntry>,
}

/// Every listing of one build
#[derive(Debug, Clone, Default)]
pub struct ListingSet {
    pub all: Listing,
    /// Category listings keyed by identifier, in order of first appearance
    pub categories: IndexMap<String, Listing>,
}

impl ListingSet {
    pub fn category(&self, identifier: &str) -> Option<&Listing> {
        self.categories.get(identifier)
    }
}

/// Sort newest first; equal dates keep their relative order
pub fn sort_by_date_desc(entries: &mut [BlogEntry]) {
    entries.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Identifier of a category page: first character title-cased
///
/// `kotlin` -> `Kotlin`
pub fn category_identifier(category: &str) -> String {
    let mut chars = category.chars();
    match chars.next() {
        Some(first) if first.is_lowercase() => first.to_uppercase().chain(chars).collect(),
        _ => category.to_string(),
    }
}

/// URL segment of a category page: first character lower-cased
///
/// `KdroidFilter` -> `kdroidFilter`
pub fn category_url_segment(category: &str) -> String {
    let mut chars = category.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Output directory name of a category page
///
/// Falls back to a slug when the URL segment is not a single, non-empty
/// path component.
fn category_page_segment(category: &str) -> String {
    let segment = category_url_segment(category);
    let is_component = !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\']);
    if is_component {
        return segment;
    }

    let fallback = match slug::slugify(category) {
        s if s.is_empty() => "uncategorized".to_string(),
        s => s,
    };
    tracing::warn!(
        "Category {:?} is not usable as a path, writing its page to {:?}",
        category,
        fallback
    );
    fallback
}

/// Heading of a category page
pub fn category_title(category: &str) -> String {
    format!("{} Posts", category_identifier(category))
}

/// Output directory names already handed out in one build
///
/// Keys are lower-cased so two names differing only in case never share a
/// directory on a case-insensitive filesystem. The owner is the category
/// identifier, or `None` for the "all posts" page.
#[derive(Default)]
struct PageSegments {
    owners: HashMap<String, Option<String>>,
}

impl PageSegments {
    fn reserve(&mut self, segment: &str) {
        self.owners.insert(segment.to_lowercase(), None);
    }

    /// `segment`, or `segment-1`, `segment-2`, ... when another listing
    /// already writes there
    fn claim(&mut self, segment: String, identifier: &str) -> String {
        let taken = |owners: &HashMap<String, Option<String>>, candidate: &str| {
            owners
                .get(&candidate.to_lowercase())
                .is_some_and(|owner| owner.as_deref() != Some(identifier))
        };

        let mut candidate = segment.clone();
        let mut suffix = 0;
        while taken(&self.owners, &candidate) {
            suffix += 1;
            candidate = format!("{}-{}", segment, suffix);
        }
        if suffix > 0 {
            tracing::warn!(
                "Category {:?} would share the directory {:?}, writing its page to {:?}",
                identifier,
                segment,
                candidate
            );
        }

        self.owners
            .insert(candidate.to_lowercase(), Some(identifier.to_string()));
        candidate
    }
}

/// Build the "all posts" listing and one listing per category
///
/// Categories are grouped by exact value. Two categories that map to the
/// same identifier (e.g. `kotlin` and `Kotlin`) would write to the same
/// page; the later one replaces the earlier and a warning is logged.
/// Distinct identifiers always get distinct output directories.
pub fn generate_listings(entries: &[BlogEntry], config: &SiteConfig) -> ListingSet {
    let mut all_entries = entries.to_vec();
    sort_by_date_desc(&mut all_entries);

    let blog_path = format!("{}/", config.blog_dir.trim_matches('/'));
    let all = Listing {
        title: config.listing_title.clone(),
        route: route_for(&config.root, &blog_path),
        path: blog_path,
        category: None,
        entries: all_entries,
    };

    let mut groups: IndexMap<&str, Vec<BlogEntry>> = IndexMap::new();
    for entry in entries {
        groups
            .entry(entry.category.as_str())
            .or_default()
            .push(entry.clone());
    }

    let mut segments = PageSegments::default();
    segments.reserve(all.path.trim_end_matches('/'));

    let mut categories: IndexMap<String, Listing> = IndexMap::new();
    for (category, mut group) in groups {
        sort_by_date_desc(&mut group);

        let identifier = category_identifier(category);
        let segment = segments.claim(category_page_segment(category), &identifier);
        let path = format!("{}/", segment);
        let listing = Listing {
            title: category_title(category),
            route: route_for(&config.root, &encode_path(&path)),
            path,
            category: Some(category.to_string()),
            entries: group,
        };

        if let Some(previous) = categories.insert(identifier.clone(), listing) {
            tracing::warn!(
                "Category {:?} replaces {:?}: both map to the page identifier {:?}",
                category,
                previous.category.unwrap_or_default(),
                identifier
            );
        }
    }

    ListingSet { all, categories }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn entry(title: &str, date: &str, category: &str) -> BlogEntry {
        BlogEntry {
            route: format!("/blog/{}", title),
            author: "Someone".to_string(),
            date: date.to_string(),
            title: title.to_string(),
            description: format!("About {}", title),
            category: category.to_string(),
            updated: None,
            tags: Vec::new(),
        }
    }

    fn titles(listing: &Listing) -> Vec<&str> {
        listing.entries.iter().map(|e| e.title.as_str()).collect()
    }

    #[test]
    fn test_all_posts_sorted_newest_first_and_stable() {
        let entries = vec![
            entry("first", "2024-01-01", "kotlin"),
            entry("second", "2024-03-01", "kotlin"),
            entry("third", "2024-01-01", "kotlin"),
        ];
        let set = generate_listings(&entries, &SiteConfig::default());
        let all = &set.all;
        assert_eq!(titles(all), vec!["second", "first", "third"]);
        assert_eq!(all.title, "Blog Posts");
        assert_eq!(all.route, "/blog/");
        assert_eq!(all.path, "blog/");
    }

    #[test]
    fn test_category_partition() {
        let entries = vec![
            entry("a", "2024-01-01", "kotlin"),
            entry("b", "2024-02-01", "android"),
            entry("c", "2024-03-01", "kotlin"),
        ];
        let set = generate_listings(&entries, &SiteConfig::default());
        assert_eq!(set.categories.len(), 2);

        let kotlin = set.category("Kotlin").unwrap();
        assert_eq!(titles(kotlin), vec!["c", "a"]);
        assert!(kotlin.entries.iter().all(|e| e.category == "kotlin"));

        let android = set.category("Android").unwrap();
        assert_eq!(titles(android), vec!["b"]);

        let union: HashSet<_> = set
            .categories
            .values()
            .flat_map(|l| l.entries.iter().map(|e| e.route.clone()))
            .collect();
        let all: HashSet<_> = entries.iter().map(|e| e.route.clone()).collect();
        assert_eq!(union, all);
    }

    #[test]
    fn test_categories_in_first_appearance_order() {
        let entries = vec![
            entry("a", "2024-01-01", "kmp"),
            entry("b", "2024-02-01", "compose"),
            entry("c", "2024-03-01", "kmp"),
        ];
        let set = generate_listings(&entries, &SiteConfig::default());
        let ids: Vec<_> = set.categories.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["Kmp", "Compose"]);
    }

    #[test]
    fn test_category_naming() {
        assert_eq!(category_identifier("kotlin"), "Kotlin");
        assert_eq!(category_identifier("KMP"), "KMP");
        assert_eq!(category_identifier("éditions"), "Éditions");
        assert_eq!(category_identifier("2024"), "2024");
        assert_eq!(category_identifier(""), "");
        assert_eq!(category_url_segment("KdroidFilter"), "kdroidFilter");
        assert_eq!(category_url_segment("android"), "android");
        assert_eq!(category_title("compose"), "Compose Posts");

        let set = generate_listings(&[entry("a", "2024", "KdroidFilter")], &SiteConfig::default());
        let listing = set.category("KdroidFilter").unwrap();
        assert_eq!(listing.route, "/kdroidFilter/");
        assert_eq!(listing.path, "kdroidFilter/");
        assert_eq!(listing.title, "KdroidFilter Posts");
    }

    #[test]
    fn test_identifier_collision_last_wins() {
        let entries = vec![
            entry("lower", "2024-01-01", "kotlin"),
            entry("upper", "2024-02-01", "Kotlin"),
        ];
        let set = generate_listings(&entries, &SiteConfig::default());
        assert_eq!(set.categories.len(), 1);
        let listing = set.category("Kotlin").unwrap();
        assert_eq!(listing.category.as_deref(), Some("Kotlin"));
        assert_eq!(titles(listing), vec!["upper"]);
        // The "all posts" listing is unaffected
        assert_eq!(set.all.entries.len(), 2);
    }

    #[test]
    fn test_unsafe_category_paths() {
        let entries = vec![
            entry("a", "2024-01-01", "../Escape"),
            entry("b", "2024-01-02", ""),
            entry("c", "2024-01-03", "Web Dev"),
        ];
        let set = generate_listings(&entries, &SiteConfig::default());
        assert_eq!(set.category("../Escape").unwrap().path, "escape/");
        assert_eq!(set.category("").unwrap().path, "uncategorized/");
        let web = set.category("Web Dev").unwrap();
        assert_eq!(web.path, "web Dev/");
        assert_eq!(web.route, "/web%20Dev/");
    }

    #[test]
    fn test_distinct_categories_get_distinct_paths() {
        let entries = vec![
            entry("a", "2024-01-01", "../Escape"),
            entry("b", "2024-01-02", "escape"),
            entry("c", "2024-01-03", "blog"),
            entry("d", "2024-01-04", "aB"),
            entry("e", "2024-01-05", "ab"),
        ];
        let set = generate_listings(&entries, &SiteConfig::default());
        assert_eq!(set.category("../Escape").unwrap().path, "escape/");
        assert_eq!(set.category("Escape").unwrap().path, "escape-1/");
        assert_eq!(set.category("Escape").unwrap().route, "/escape-1/");
        assert_eq!(set.category("Blog").unwrap().path, "blog-1/");
        assert_eq!(set.category("AB").unwrap().path, "aB/");
        assert_eq!(set.category("Ab").unwrap().path, "ab-1/");

        let paths: HashSet<_> = set
            .categories
            .values()
            .map(|l| l.path.to_lowercase())
            .chain([set.all.path.clone()])
            .collect();
        assert_eq!(paths.len(), set.categories.len() + 1);
    }

    #[test]
    fn test_empty_input() {
        let set = generate_listings(&[], &SiteConfig::default());
        assert!(set.all.entries.is_empty());
        assert!(set.categories.is_empty());
    }

    #[test]
    fn test_site_root_prefixes_routes() {
        let config = SiteConfig {
            root: "/site/".to_string(),
            ..Default::default()
        };
        let set = generate_listings(&[entry("a", "2024", "kotlin")], &config);
        assert_eq!(set.all.route, "/site/blog/");
        assert_eq!(set.category("Kotlin").unwrap().route, "/site/kotlin/");
    }
}
