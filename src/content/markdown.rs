//! Markdown rendering

use pulldown_cmark::{html, Event, Options, Parser, TagEnd};

use crate::helpers::collapse_whitespace;

/// Marker separating a hand-written excerpt from the rest of the post
const MORE_MARKER: &str = "<!-- more -->";

/// Markdown renderer
pub struct MarkdownRenderer {
    options: Options,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer with the GFM extensions enabled
    pub fn new() -> Self {
        // YAML metadata blocks stay off: front-matter is split off beforehand
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_GFM;
        Self { options }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);
        let mut html_output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut html_output, parser);
        html_output
    }

    /// Visible text of the rendered markdown, whitespace collapsed
    pub fn plain_text(&self, markdown: &str) -> String {
        let mut text = String::with_capacity(markdown.len());

        for event in Parser::new_ext(markdown, self.options) {
            match event {
                Event::Text(t) | Event::Code(t) => text.push_str(&t),
                Event::SoftBreak | Event::HardBreak => text.push(' '),
                Event::End(
                    TagEnd::Paragraph
                    | TagEnd::Heading(_)
                    | TagEnd::Item
                    | TagEnd::CodeBlock
                    | TagEnd::TableCell,
                ) => text.push(' '),
                _ => {}
            }
        }

        collapse_whitespace(&text)
    }

    /// Parse excerpt from content (split by `<!-- more -->`)
    ///
    /// Returns the excerpt markdown, if the marker is present, and the full
    /// body with the marker removed.
    pub fn split_excerpt(content: &str) -> (Option<String>, String) {
        if let Some(pos) = content.find(MORE_MARKER) {
            let excerpt = content[..pos].trim().to_string();
            let remaining = content[pos + MORE_MARKER.len()..].trim().to_string();
            let full = format!("{}\n\n{}", excerpt, remaining);
            (Some(excerpt), full)
        } else {
            (None, content.to_string())
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}
