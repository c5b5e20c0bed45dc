//! Initialize a new blog site

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::config::SiteConfig;

const CONFIG: &str = r#"# Site
title: K-Droid Dev
description: Tech chatter, tutorials, and career advice
author: John Doe
language: en

# URL
url: http://example.com
root: /

# Directory
source_dir: markdown
public_dir: public
blog_dir: blog
data_dir: _data
exclude: []

# Listings
listing_title: Blog Posts
date_format: MMMM D, YYYY

# Writing
highlight:
  theme: base16-ocean.dark
  line_number: false

# Layout
menu:
  Last posts: /blog/

theme:
  css_prefix: bs
  color_mode: light
"#;

const POST_SCAFFOLD: &str = r#"---
title: {{ title }}
description: {{ description }}
author: {{ author }}
date: {{ date }}
category: {{ category }}
tags: []
---
"#;

const STYLESHEET: &str = r#"body {
  margin: 0;
  font-family: system-ui, sans-serif;
  background: var(--bs-background);
  color: var(--bs-color);
}

a {
  color: var(--bs-brand);
}

.hover-link {
  visibility: hidden;
  text-decoration: none;
}

h1:hover .hover-link,
h2:hover .hover-link,
h3:hover .hover-link {
  visibility: visible;
}

.inline-code {
  border: 1px solid var(--bs-border);
  border-radius: 4px;
  padding: 0 4px;
}
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let defaults = SiteConfig::default();
    let blog_dir = target_dir
        .join(&defaults.source_dir)
        .join(&defaults.blog_dir);

    fs::create_dir_all(&blog_dir)
        .with_context(|| format!("creating {}", blog_dir.display()))?;
    fs::create_dir_all(target_dir.join("scaffolds"))?;
    fs::create_dir_all(target_dir.join("static/css"))?;

    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        anyhow::bail!("{:?} already exists", config_path);
    }
    fs::write(&config_path, CONFIG)?;

    fs::write(target_dir.join("scaffolds/post.md"), POST_SCAFFOLD)?;
    fs::write(target_dir.join("static/css/site.css"), STYLESHEET)?;

    let today = chrono::Local::now().format("%Y-%m-%d");
    let sample_post = format!(
        r#"---
title: Hello World
description: The first post of this blog
author: John Doe
date: {}
category: general
tags: [welcome]
---

Welcome! This is your very first post.

## Quick Start

### Create a new post

```bash
$ kdroid-blog new "My New Post" --category kotlin
```

### Run server

```bash
$ kdroid-blog server
```

### Generate static files

```bash
$ kdroid-blog generate
```
"#,
        today
    );

    fs::write(blog_dir.join("HelloWorld.md"), sample_post)?;

    Ok(())
}
