//! Built-in blog templates using the Tera template engine
//!
//! The layout, listing and article templates are embedded in the binary.
//! Autoescaping is on for every template, so values coming from
//! frontmatter are escaped by construction; only rendered markdown is
//! marked `safe`.

use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::Heading;
use crate::error::Result;
use crate::helpers::{date_text, date_xml};

/// Template renderer with the embedded blog templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer; `date_format` is the default display format
    /// of the `date_text` filter
    pub fn new(date_format: &str) -> Result<Self> {
        let mut tera = Tera::default();

        tera.autoescape_on(vec![".html"]);
        tera.set_escape_fn(escape_html);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("blog/layout.html")),
            ("listing.html", include_str!("blog/listing.html")),
            ("article.html", include_str!("blog/article.html")),
            ("partials/meta.html", include_str!("blog/partials/meta.html")),
        ])?;

        let default_format = date_format.to_string();
        tera.register_filter(
            "date_text",
            move |value: &tera::Value,
                  args: &HashMap<String, tera::Value>|
                  -> tera::Result<tera::Value> {
                let s = tera::try_get_value!("date_text", "value", String, value);
                let format = match args.get("format") {
                    Some(val) => tera::try_get_value!("date_text", "format", String, val),
                    None => default_format.clone(),
                };
                Ok(tera::Value::String(date_text(&s, &format)))
            },
        );
        tera.register_filter("date_xml", date_xml_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Escape text for HTML content and quoted attributes
///
/// Unlike Tera's default this leaves `/` alone so routes stay readable.
fn escape_html(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#x27;"),
            _ => output.push(c),
        }
    }
    output
}

/// Tera filter: machine-readable date
fn date_xml_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_xml", "value", String, value);
    Ok(tera::Value::String(date_xml(&s)))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub root: String,
}

impl SiteData {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            language: config.language.clone(),
            root: config.root.clone(),
        }
    }
}

/// A rendered markdown document
#[derive(Debug, Clone, Serialize)]
pub struct ArticleData {
    /// Frontmatter title, empty when absent
    pub title: String,
    pub route: String,
    /// Rendered HTML body
    pub content: String,
    pub headings: Vec<Heading>,
}
