//! Post model

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use crate::routes::resolve_slug;

/// A blog post
///
/// Built once per build from one source file and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    /// Opaque identifier, stable across builds for the same source file
    pub id: String,

    /// URL path, e.g. `/my-first-post/`
    pub slug: String,

    /// Post title
    pub title: String,

    /// Short description from front-matter
    pub description: String,

    /// Post tags, in front-matter order
    pub tags: Vec<String>,

    /// Whether the post is published; drafts only show up on the drafts page
    pub published: bool,

    /// Publication date, used for ordering
    pub date: NaiveDate,

    /// Rendered HTML content
    pub html: String,

    /// Plain-text excerpt
    pub excerpt: String,

    /// Estimated reading time in minutes
    pub time_to_read: u32,

    /// Source file path, relative to the content directory
    pub source: PathBuf,
}

impl Post {
    /// Create a new post with minimal required fields
    ///
    /// The id and slug are derived from `source`.
    pub fn new(title: String, date: NaiveDate, source: impl Into<PathBuf>) -> Self {
        let source = source.into();
        Self {
            id: post_id(&source),
            slug: resolve_slug(&source),
            title,
            description: String::new(),
            tags: Vec::new(),
            published: false,
            date,
            html: String::new(),
            excerpt: String::new(),
            time_to_read: 1,
            source,
        }
    }
}

/// Hash of the relative source path, as 16 hex digits
fn post_id(source: &Path) -> String {
    let mut hasher = DefaultHasher::new();
    for component in source.components() {
        component.as_os_str().hash(&mut hasher);
    }
    format!("{:016x}", hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_new_post_derives_slug_and_id() {
        let post = Post::new("Hello".to_string(), date(), "hello-world.md");
        assert_eq!(post.slug, "/hello-world/");
        assert_eq!(post.id.len(), 16);
        assert!(!post.published);
    }

    #[test]
    fn test_id_is_stable_per_source() {
        let a = Post::new("A".to_string(), date(), "2019/intro.md");
        let b = Post::new("B".to_string(), date(), "2019/intro.md");
        let c = Post::new("A".to_string(), date(), "2019/outro.md");
        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
    }
}
