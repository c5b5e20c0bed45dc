//! Markdown rendering with syntax highlighting and heading anchors

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{
    highlighted_html_for_string, start_highlighted_html_snippet, styled_line_to_highlighted_html,
    IncludeBackground,
};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

/// A heading of a rendered document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    pub level: u8,
    pub id: String,
    pub text: String,
}

/// Output of [`MarkdownRenderer::render`]
#[derive(Debug, Clone, Default)]
pub struct RenderedMarkdown {
    pub html: String,
    pub headings: Vec<Heading>,
}

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    line_numbers: bool,
}

/// Heading being collected
struct OpenHeading<'a> {
    level: HeadingLevel,
    id: Option<String>,
    classes: Vec<String>,
    text: String,
    events: Vec<Event<'a>>,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_options("base16-ocean.dark", false)
    }

    /// Create with custom settings
    pub fn with_options(theme: &str, line_numbers: bool) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
            line_numbers,
        }
    }

    /// Render markdown to HTML
    ///
    /// Every heading gets an id unique within this document and a
    /// `hover-link` anchor pointing back at it.
    pub fn render(&self, markdown: &str) -> RenderedMarkdown {
        // Front-matter is stripped by FrontMatter::parse, so no metadata blocks here
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        let mut headings = Vec::new();
        let mut ids = HeadingIds::default();

        let mut code_block: Option<Option<String>> = None;
        let mut code_block_content = String::new();
        let mut heading: Option<OpenHeading> = None;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .filter(|l| !l.is_empty())
                            .map(str::to_string),
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some(lang);
                    code_block_content.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    let lang = code_block.take().flatten();
                    let highlighted = self.highlight_code(&code_block_content, lang.as_deref());
                    events.push(Event::Html(CowStr::from(highlighted)));
                }
                Event::Text(text) if code_block.is_some() => {
                    code_block_content.push_str(&text);
                }
                Event::Start(Tag::Heading {
                    level, id, classes, ..
                }) => {
                    heading = Some(OpenHeading {
                        level,
                        id: id.map(|i| i.to_string()),
                        classes: classes.iter().map(|c| c.to_string()).collect(),
                        text: String::new(),
                        events: Vec::new(),
                    });
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some(open) = heading.take() {
                        let (html, entry) = finish_heading(open, &mut ids);
                        events.push(Event::Html(CowStr::from(html)));
                        headings.push(entry);
                    }
                }
                Event::Code(code) => {
                    let html = format!(r#"<code class="inline-code">{}</code>"#, html_escape(&code));
                    match heading.as_mut() {
                        Some(open) => {
                            open.text.push_str(&code);
                            open.events.push(Event::Html(CowStr::from(html)));
                        }
                        None => events.push(Event::Html(CowStr::from(html))),
                    }
                }
                other => match heading.as_mut() {
                    Some(open) => {
                        if let Event::Text(text) = &other {
                            open.text.push_str(text);
                        }
                        open.events.push(other);
                    }
                    None => events.push(other),
                },
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        RenderedMarkdown {
            html: html_output,
            headings,
        }
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");
        let lang_class = html_escape(lang);

        // Try to find syntax for the language
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next());

        let highlighted = theme.and_then(|theme| {
            if self.line_numbers {
                self.highlight_lines(code, syntax, theme)
                    .map(|lines| add_line_numbers(&lines, theme, &lang_class))
            } else {
                highlighted_html_for_string(code, &self.syntax_set, syntax, theme)
                    .ok()
                    .map(|html| {
                        format!(
                            r#"<div class="code-block language-{}">{}</div>"#,
                            lang_class, html
                        )
                    })
            }
        });

        highlighted.unwrap_or_else(|| {
            format!(
                r#"<div class="code-block language-{}"><pre><code>{}</code></pre></div>"#,
                lang_class,
                html_escape(code)
            )
        })
    }

    /// Highlight each source line on its own, keeping line endings
    fn highlight_lines(
        &self,
        code: &str,
        syntax: &SyntaxReference,
        theme: &Theme,
    ) -> Option<Vec<String>> {
        let mut highlighter = HighlightLines::new(syntax, theme);
        LinesWithEndings::from(code)
            .map(|line| {
                let regions = highlighter.highlight_line(line, &self.syntax_set).ok()?;
                styled_line_to_highlighted_html(&regions, IncludeBackground::No).ok()
            })
            .collect()
    }
}

/// Gutter with one number per source line next to the highlighted code
fn add_line_numbers(lines: &[String], theme: &Theme, lang: &str) -> String {
    let (pre_open, _) = start_highlighted_html_snippet(theme);

    let gutter = (1..=lines.len())
        .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<div class="code-block language-{}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}{}</pre></td></tr></table></div>"#,
        lang,
        gutter,
        pre_open,
        lines.concat()
    )
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-document heading id allocation
#[derive(Default)]
struct HeadingIds {
    counts: HashMap<String, usize>,
    taken: HashSet<String>,
}

impl HeadingIds {
    /// `faq`, `faq-1`, `faq-2`, ...
    ///
    /// A suffixed id never repeats one already handed out, including a
    /// heading whose own text slugs to `faq-1`.
    fn allocate(&mut self, base: &str) -> String {
        let mut id = base.to_string();
        if self.taken.contains(&id) {
            let suffix = self.counts.entry(base.to_string()).or_insert(0);
            loop {
                *suffix += 1;
                id = format!("{}-{}", base, suffix);
                if !self.taken.contains(&id) {
                    break;
                }
            }
        }
        self.taken.insert(id.clone());
        id
    }
}

fn finish_heading(open: OpenHeading<'_>, ids: &mut HeadingIds) -> (String, Heading) {
    let level = heading_level_to_num(open.level);
    let text = open.text.trim().to_string();

    let id = match open.id {
        Some(explicit) => ids.allocate(&explicit),
        None => {
            let base = slug::slugify(&text);
            ids.allocate(if base.is_empty() { "section" } else { &base })
        }
    };

    let mut inner = String::new();
    html::push_html(&mut inner, open.events.into_iter());

    let class_attr = if open.classes.is_empty() {
        String::new()
    } else {
        format!(r#" class="{}""#, html_escape(&open.classes.join(" ")))
    };

    let html = format!(
        r##"<h{level} id="{id}"{class_attr}>{inner} <a class="hover-link" href="#{id}">#</a></h{level}>"##,
        level = level,
        id = html_escape(&id),
        class_attr = class_attr,
        inner = inner,
    );

    (html, Heading { level, id, text })
}

fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
