//! iriedev: static site generator for a personal markdown blog
//!
//! Posts are markdown files with YAML front-matter. A build lists published
//! posts newest first on the home page, collects drafts on their own page,
//! and gives every published post a detail page at its slug.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod routes;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// A blog site rooted at a directory
#[derive(Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Markdown posts
    pub content_dir: PathBuf,
    /// Files copied verbatim into the output
    pub static_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Markdown body of the about page
    pub about_path: PathBuf,
}

impl Blog {
    /// Open the blog in `base_dir`, reading `site.yml` when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(config::CONFIG_FILE);

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let content_dir = base_dir.join(&config.content_dir);
        let static_dir = base_dir.join(&config.static_dir);
        let public_dir = base_dir.join(&config.public_dir);
        let about_path = base_dir.join(&config.about_file);

        Ok(Self {
            config,
            base_dir,
            content_dir,
            static_dir,
            public_dir,
            about_path,
        })
    }

    /// Sibling of the output directory where a build is assembled
    pub fn staging_dir(&self) -> PathBuf {
        let name = self
            .public_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "public".to_string());
        self.public_dir.with_file_name(format!("{}.staging", name))
    }

    /// Load every post from the content directory
    pub fn load_posts(&self) -> Result<content::PostSet> {
        content::loader::ContentLoader::new(self).load_posts()
    }

    /// Build the static site
    pub fn build(&self) -> Result<commands::generate::BuildReport> {
        commands::generate::run(self)
    }

    /// Remove generated output
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Scaffold a new post
    pub fn new_post(&self, title: &str, published: bool) -> Result<PathBuf> {
        commands::new::run(self, title, published)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_blog_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        assert_eq!(blog.content_dir, dir.path().join("posts"));
        assert_eq!(blog.public_dir, dir.path().join("public"));
        assert_eq!(blog.staging_dir(), dir.path().join("public.staging"));
        assert_eq!(blog.about_path, dir.path().join("about.md"));
    }

    #[test]
    fn test_blog_reads_site_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("site.yml"),
            "title: Elsewhere\ncontent_dir: writing\npublic_dir: out\n",
        )
        .unwrap();

        let blog = Blog::new(dir.path()).unwrap();
        assert_eq!(blog.config.title, "Elsewhere");
        assert_eq!(blog.content_dir, dir.path().join("writing"));
        assert_eq!(blog.staging_dir(), dir.path().join("out.staging"));
    }
}
