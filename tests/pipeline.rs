//! End-to-end builds of small sites

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use kdroid_blog::config::SiteConfig;
use kdroid_blog::content::loader::ContentLoader;
use kdroid_blog::content::BlogEntry;
use kdroid_blog::listing::Listing;
use kdroid_blog::Blog;
use tempfile::TempDir;
use walkdir::WalkDir;

fn write(dir: &Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn post(title: &str, date: &str, category: &str) -> String {
    format!(
        "---\ntitle: '{}'\ndescription: About {}\nauthor: Jane\ndate: {}\ncategory: {}\n---\n\n## FAQ\n\nText\n\n## FAQ\n",
        title.replace('\'', "''"),
        title,
        date,
        category
    )
}

fn site() -> (TempDir, Blog) {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("markdown");
    write(&source, "blog/First.md", &post("First", "2024-01-01", "kotlin"));
    write(&source, "blog/Second.md", &post("Second", "2024-03-01", "android"));
    write(&source, "blog/Third.md", &post("Third", "2024-01-01", "kotlin"));
    write(&source, "About.md", "---\ntitle: About\n---\nWho we are\n");
    write(dir.path(), "static/css/site.css", "body {}");
    let blog = Blog::new(dir.path()).unwrap();
    (dir, blog)
}

fn read_listing(path: PathBuf) -> Listing {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn titles(listing: &Listing) -> Vec<&str> {
    listing.entries.iter().map(|e| e.title.as_str()).collect()
}

/// Every file under `dir` with its bytes
fn snapshot(dir: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    WalkDir::new(dir)
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let relative = e.path().strip_prefix(dir).unwrap().to_path_buf();
            (relative, fs::read(e.path()).unwrap())
        })
        .collect()
}

#[test]
fn test_full_build() {
    let (dir, blog) = site();
    blog.generate().unwrap();
    let public = dir.path().join("public");

    let all = read_listing(public.join("_data/blog/index.json"));
    assert_eq!(titles(&all), vec!["Second", "First", "Third"]);
    assert_eq!(all.route, "/blog/");

    let kotlin = read_listing(public.join("_data/blog/categories/kotlin.json"));
    assert_eq!(titles(&kotlin), vec!["First", "Third"]);
    assert_eq!(kotlin.title, "Kotlin Posts");
    assert_eq!(kotlin.route, "/kotlin/");

    let listing = fs::read_to_string(public.join("blog/index.html")).unwrap();
    let second = listing.find("Second").unwrap();
    let first = listing.find("First").unwrap();
    let third = listing.find("Third").unwrap();
    assert!(second < first && first < third);
    assert!(listing.contains(r#"<a href="/blog/second">Second</a>"#));

    assert!(public.join("kotlin/index.html").is_file());
    assert!(public.join("android/index.html").is_file());
    assert!(public.join("css/site.css").is_file());

    let article = fs::read_to_string(public.join("blog/first/index.html")).unwrap();
    assert!(article.contains(r#"<h2 id="faq">"#));
    assert!(article.contains(r#"<h2 id="faq-1">"#));
    assert!(article.contains(r##"<a class="hover-link" href="#faq-1">#</a>"##));

    let about = fs::read_to_string(public.join("about/index.html")).unwrap();
    assert!(about.contains("Who we are"));
}

#[test]
fn test_build_is_idempotent() {
    let (dir, blog) = site();
    let public = dir.path().join("public");

    blog.generate().unwrap();
    let first = snapshot(&public);
    blog.generate().unwrap();
    let second = snapshot(&public);

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn test_rebuild_drops_emptied_category() {
    let (dir, blog) = site();
    let public = dir.path().join("public");
    blog.generate().unwrap();
    assert!(public.join("android/index.html").is_file());

    fs::remove_file(dir.path().join("markdown/blog/Second.md")).unwrap();
    blog.generate().unwrap();

    assert!(!public.join("android").exists());
    assert!(!public.join("_data/blog/categories/android.json").exists());
    assert!(public.join("_data/blog/categories/kotlin.json").is_file());
    let all = read_listing(public.join("_data/blog/index.json"));
    assert_eq!(titles(&all), vec!["First", "Third"]);
}

#[test]
fn test_quotes_survive_round_trip() {
    let dir = TempDir::new().unwrap();
    write(
        &dir.path().join("markdown"),
        "blog/Quoted.md",
        &post(r#"He said "hi" & <left>"#, "2024-01-01", "kotlin"),
    );
    let blog = Blog::new(dir.path()).unwrap();
    blog.generate().unwrap();
    let public = dir.path().join("public");

    let all = read_listing(public.join("_data/blog/index.json"));
    assert_eq!(all.entries[0].title, r#"He said "hi" & <left>"#);

    let html = fs::read_to_string(public.join("blog/index.html")).unwrap();
    assert!(html.contains("He said &quot;hi&quot; &amp; &lt;left&gt;"));
    assert!(!html.contains("<left>"));
}

#[test]
fn test_empty_site() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("markdown")).unwrap();
    let blog = Blog::new(dir.path()).unwrap();
    blog.generate().unwrap();
    let public = dir.path().join("public");

    let all = read_listing(public.join("_data/blog/index.json"));
    assert!(all.entries.is_empty());
    assert!(!public.join("_data/blog/categories").exists());
    assert!(public.join("blog/index.html").is_file());
}

#[test]
fn test_skipped_documents() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("markdown");
    write(&source, "blog/Good.md", &post("Good", "2024-01-01", "kotlin"));
    write(
        &source,
        "blog/TwoAuthors.md",
        "---\ntitle: T\ndescription: D\nauthor: [A, B]\ndate: 2024-01-01\ncategory: kotlin\n---\n",
    );
    write(
        &source,
        "blog/NoCategory.md",
        "---\ntitle: T\ndescription: D\nauthor: A\ndate: 2024-01-01\n---\n",
    );
    let blog = Blog::new(dir.path()).unwrap();

    let (documents, entries) = ContentLoader::new(&blog).load_entries().unwrap();
    assert_eq!(documents.len(), 3);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].title, "Good");

    let skipped: Vec<_> = documents
        .iter()
        .filter_map(|d| BlogEntry::from_document(d).err())
        .map(|e| e.missing)
        .collect();
    assert_eq!(skipped, vec![vec!["category"], vec!["author"]]);
}

#[test]
fn test_missing_source_dir_fails() {
    let dir = TempDir::new().unwrap();
    let blog = Blog::with_config(dir.path(), SiteConfig::default());
    assert!(blog.generate().is_err());
}

#[test]
fn test_clean_removes_output() {
    let (dir, blog) = site();
    blog.generate().unwrap();
    blog.clean().unwrap();
    assert!(!dir.path().join("public").exists());
}
