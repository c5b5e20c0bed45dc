//! List site content

use anyhow::Result;
use indexmap::IndexMap;

use crate::content::loader::ContentLoader;
use crate::content::BlogEntry;
use crate::listing::generate_listings;
use crate::Blog;

/// Print site content by type
pub fn run(blog: &Blog, content_type: &str) -> Result<()> {
    for line in lines(blog, content_type)? {
        println!("{}", line);
    }
    Ok(())
}

/// Lines printed by [`run`]
pub fn lines(blog: &Blog, content_type: &str) -> Result<Vec<String>> {
    let loader = ContentLoader::new(blog);
    let mut out = Vec::new();

    match content_type {
        "post" | "posts" => {
            let (_, entries) = loader.load_entries()?;
            let listings = generate_listings(&entries, &blog.config);
            out.push(format!("Posts ({}):", listings.all.entries.len()));
            for entry in &listings.all.entries {
                out.push(format!(
                    "  {} - {} [{}] {}",
                    entry.date, entry.title, entry.category, entry.route
                ));
            }
        }
        "category" | "categories" => {
            let (_, entries) = loader.load_entries()?;
            let listings = generate_listings(&entries, &blog.config);
            out.push(format!("Categories ({}):", listings.categories.len()));
            for (identifier, listing) in &listings.categories {
                out.push(format!(
                    "  {} ({}) {}",
                    identifier,
                    listing.entries.len(),
                    listing.route
                ));
            }
        }
        "tag" | "tags" => {
            let (_, entries) = loader.load_entries()?;
            let mut tags: IndexMap<&str, usize> = IndexMap::new();
            for tag in entries.iter().flat_map(|e| e.tags.iter()) {
                *tags.entry(tag.as_str()).or_insert(0) += 1;
            }
            out.push(format!("Tags ({}):", tags.len()));
            let mut tags: Vec<_> = tags.into_iter().collect();
            tags.sort_by(|a, b| b.1.cmp(&a.1));
            for (tag, count) in tags {
                out.push(format!("  {} ({})", tag, count));
            }
        }
        "skipped" => {
            let documents = loader.load_documents()?;
            let skipped: Vec<_> = documents
                .iter()
                .filter_map(|doc| BlogEntry::from_document(doc).err())
                .collect();
            out.push(format!("Skipped ({}):", skipped.len()));
            for missing in skipped {
                out.push(format!(
                    "  {} (missing: {})",
                    missing.file_path.display(),
                    missing.missing.join(", ")
                ));
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, category, tag, skipped",
                content_type
            );
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use std::fs;
    use tempfile::TempDir;

    fn site() -> (TempDir, Blog) {
        let dir = TempDir::new().unwrap();
        let blog = Blog::with_config(dir.path(), SiteConfig::default());
        let posts = [
            ("blog/Older.md", "2024-01-01", "kotlin", "[kmp, compose]"),
            ("blog/Newer.md", "2024-02-01", "android", "[compose]"),
        ];
        for (name, date, category, tags) in posts {
            let path = blog.source_dir.join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(
                path,
                format!(
                    "---\ntitle: {name}\ndescription: d\nauthor: a\ndate: {date}\ncategory: {category}\ntags: {tags}\n---\n"
                ),
            )
            .unwrap();
        }
        fs::write(blog.source_dir.join("Draft.md"), "---\ntitle: Draft\n---\n").unwrap();
        (dir, blog)
    }

    #[test]
    fn test_list_posts() {
        let (_dir, blog) = site();
        let out = lines(&blog, "post").unwrap();
        assert_eq!(out[0], "Posts (2):");
        assert!(out[1].starts_with("  2024-02-01 - blog/Newer.md [android]"));
        assert!(out[2].starts_with("  2024-01-01"));
    }

    #[test]
    fn test_list_categories_and_tags() {
        let (_dir, blog) = site();
        assert_eq!(
            lines(&blog, "category").unwrap(),
            vec!["Categories (2):", "  Android (1) /android/", "  Kotlin (1) /kotlin/"]
        );
        assert_eq!(
            lines(&blog, "tag").unwrap(),
            vec!["Tags (2):", "  compose (2)", "  kmp (1)"]
        );
    }

    #[test]
    fn test_list_skipped() {
        let (_dir, blog) = site();
        let out = lines(&blog, "skipped").unwrap();
        assert_eq!(out[0], "Skipped (1):");
        assert!(out[1].contains("Draft.md"));
        assert!(out[1].ends_with("(missing: description, author, date, category)"));
    }

    #[test]
    fn test_unknown_type() {
        let (_dir, blog) = site();
        assert!(lines(&blog, "pages").is_err());
    }
}
