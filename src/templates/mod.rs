//! Built-in site templates using the Tera template engine
//!
//! Templates are embedded in the binary; a site only supplies content,
//! `site.yml`, and static files.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::Post;
use crate::helpers::{date_iso, format_date, url_for};

/// Template renderer with the embedded site theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Autoescaping would also escape `/` in URLs; text fields are
        // escaped explicitly in the templates instead
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("index.html", include_str!("site/index.html")),
            ("drafts.html", include_str!("site/drafts.html")),
            ("about.html", include_str!("site/about.html")),
            ("post.html", include_str!("site/post.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("site/partials/header.html"),
            ),
            (
                "partials/footer.html",
                include_str!("site/partials/footer.html"),
            ),
            (
                "partials/post_listing.html",
                include_str!("site/partials/post_listing.html"),
            ),
        ])?;

        tera.register_filter("date_format", date_format_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: format an ISO date (`YYYY-MM-DD`) with a Moment.js-style
/// format, e.g. `{{ post.date | date_format(format="MMMM Do YYYY") }}`
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "YYYY-MM-DD".to_string(),
    };

    let date = chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d")
        .map_err(|e| tera::Error::msg(format!("date_format: invalid date {:?}: {}", s, e)))?;
    Ok(tera::Value::String(format_date(&date, &format)))
}

// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub contact_email: String,
    pub keywords: String,
    pub language: String,
    pub date_format: String,
    pub root: String,
    pub home_url: String,
    pub about_url: String,
}

impl SiteData {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            contact_email: config.contact_email.clone(),
            keywords: config.keywords.join(", "),
            language: config.language.clone(),
            date_format: config.date_format.clone(),
            root: url_for(config, "/"),
            home_url: url_for(config, "/"),
            about_url: url_for(config, "/about/"),
        }
    }
}

/// One entry of a post list page
#[derive(Debug, Clone, Serialize)]
pub struct PostListingData {
    pub id: String,
    pub title: String,
    pub date: String,
    pub excerpt: String,
    pub time_to_read: u32,
    pub url: String,
}

impl PostListingData {
    pub fn new(post: &Post, config: &SiteConfig) -> Self {
        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            date: date_iso(&post.date),
            excerpt: post.excerpt.clone(),
            time_to_read: post.time_to_read,
            url: url_for(config, &post.slug),
        }
    }
}

/// A draft shown in full on the drafts page
#[derive(Debug, Clone, Serialize)]
pub struct DraftData {
    pub id: String,
    pub title: String,
    pub date: String,
    pub html: String,
}

impl From<&Post> for DraftData {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            date: date_iso(&post.date),
            html: post.html.clone(),
        }
    }
}

/// A post detail page
#[derive(Debug, Clone, Serialize)]
pub struct PostDetailData {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub date: String,
    pub time_to_read: u32,
    pub html: String,
}

impl From<&Post> for PostDetailData {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            description: post.description.clone(),
            tags: post.tags.clone(),
            date: date_iso(&post.date),
            time_to_read: post.time_to_read,
            html: post.html.clone(),
        }
    }
}
