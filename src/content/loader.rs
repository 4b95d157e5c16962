//! Content loader - loads posts from the content directory

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use super::{FrontMatter, MarkdownRenderer, Post, PostSet};
use crate::helpers::{prune, time_to_read};
use crate::Blog;

/// Loads content from the content directory
pub struct ContentLoader<'a> {
    blog: &'a Blog,
    renderer: MarkdownRenderer,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(blog: &'a Blog) -> Self {
        Self {
            blog,
            renderer: MarkdownRenderer::new(),
        }
    }

    /// Load every post under the content directory.
    ///
    /// Files are visited in file-name order so the resulting source order is
    /// deterministic. The first file that fails to load fails the whole load.
    pub fn load_posts(&self) -> Result<PostSet> {
        let content_dir = &self.blog.content_dir;
        if !content_dir.exists() {
            tracing::warn!("Content directory {:?} does not exist", content_dir);
            return Ok(PostSet::default());
        }

        let mut posts = Vec::new();

        for entry in WalkDir::new(content_dir)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.with_context(|| format!("Failed to walk {:?}", content_dir))?;
            let path = entry.path();
            if path.is_file() && is_markdown_file(path) {
                let post = self.load_post(path)?;
                tracing::debug!("Loaded {:?} -> {}", post.source, post.slug);
                posts.push(post);
            }
        }

        Ok(PostSet::new(posts))
    }

    /// Load a single post from a file
    fn load_post(&self, path: &Path) -> Result<Post> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;

        // Source path relative to the content dir
        let source = path
            .strip_prefix(&self.blog.content_dir)
            .unwrap_or(path)
            .to_path_buf();

        let (fm, body) = FrontMatter::parse(&source, &content)?;
        let date = fm.parse_date(&source)?;
        let published = fm.is_published();

        // Title falls back to the file name
        let title = fm.title.unwrap_or_else(|| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Untitled")
                .to_string()
        });

        let config = &self.blog.config;
        let (excerpt_md, full_md) = MarkdownRenderer::split_excerpt(body);
        let html = self.renderer.render(&full_md);
        let text = self.renderer.plain_text(&full_md);
        let excerpt = match excerpt_md {
            Some(md) => self.renderer.plain_text(&md),
            None => prune(&text, config.excerpt_length),
        };

        let mut post = Post::new(title, date, source);
        post.description = fm.description.unwrap_or_default();
        post.tags = fm.tags.unwrap_or_default();
        post.published = published;
        post.html = html;
        post.excerpt = excerpt;
        post.time_to_read = time_to_read(&text, config.words_per_minute);

        Ok(post)
    }
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}
