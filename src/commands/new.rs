//! Create a new post

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::Blog;

/// Category used when none is given
pub const DEFAULT_CATEGORY: &str = "uncategorized";

const DEFAULT_SCAFFOLD: &str = r#"---
title: {{ title }}
description: {{ description }}
author: {{ author }}
date: {{ date }}
category: {{ category }}
tags: []
---
"#;

/// Create a new post from `scaffolds/post.md`
///
/// The post lands in the blog directory as `TitleInPascalCase.md` unless
/// `path` (relative to the source directory, without extension) is given.
/// Existing files are never overwritten.
pub fn create_post(
    blog: &Blog,
    title: &str,
    category: Option<&str>,
    path: Option<&str>,
) -> Result<PathBuf> {
    let now = chrono::Local::now();

    let relative = match path {
        Some(p) => format!("{}.md", p.trim_matches('/')),
        None => format!(
            "{}/{}.md",
            blog.config.blog_dir.trim_matches('/'),
            file_stem(title)
        ),
    };
    let file_path = blog.source_dir.join(relative);

    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let scaffold_path = blog.base_dir.join("scaffolds").join("post.md");
    let scaffold_content = if scaffold_path.exists() {
        fs::read_to_string(&scaffold_path)
            .with_context(|| format!("reading {}", scaffold_path.display()))?
    } else {
        DEFAULT_SCAFFOLD.to_string()
    };

    // Values are written as double-quoted YAML scalars
    let content = scaffold_content
        .replace("{{ title }}", &yaml_string(title))
        .replace("{{ description }}", &yaml_string(""))
        .replace("{{ author }}", &yaml_string(&blog.config.author))
        .replace("{{ date }}", &yaml_string(&now.format("%Y-%m-%d").to_string()))
        .replace(
            "{{ category }}",
            &yaml_string(category.unwrap_or(DEFAULT_CATEGORY)),
        );

    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)
        .with_context(|| format!("writing {}", file_path.display()))?;

    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}

/// `My first post!` -> `MyFirstPost`
fn file_stem(title: &str) -> String {
    let stem: String = title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect();

    if stem.is_empty() {
        "Untitled".to_string()
    } else {
        stem
    }
}

fn yaml_string(value: &str) -> String {
    // A JSON string is a valid YAML double-quoted scalar
    serde_json::Value::String(value.to_string()).to_string()
}
