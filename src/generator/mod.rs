//! Generator module - renders the site with the built-in Tera templates
//!
//! Every page is rendered in memory first. Only a fully rendered site is
//! written, into a staging directory that then replaces the output directory,
//! so a failed build never leaves partial output behind.

use anyhow::{Context as _, Result};
use chrono::Datelike;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tera::Context;
use walkdir::WalkDir;

use crate::content::{MarkdownRenderer, Post, PostSet};
use crate::error::BuildError;
use crate::helpers::url_for;
use crate::routes::RouteTable;
use crate::templates::{DraftData, PostDetailData, PostListingData, SiteData, TemplateRenderer};
use crate::Blog;

/// A rendered page and the route it is served at
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub route: String,
    pub html: String,
}

impl RenderedPage {
    /// File path of this page under `public_dir`: `/a/b/` -> `a/b/index.html`
    pub fn output_path(&self, public_dir: &Path) -> PathBuf {
        let clean = self.route.trim_matches('/');
        if clean.is_empty() {
            public_dir.join("index.html")
        } else {
            public_dir.join(clean).join("index.html")
        }
    }
}

/// All pages of one build
#[derive(Debug, Clone, Default)]
pub struct RenderedSite {
    pub pages: Vec<RenderedPage>,
}

impl RenderedSite {
    pub fn page(&self, route: &str) -> Option<&RenderedPage> {
        self.pages.iter().find(|p| p.route == route)
    }
}

/// Static site generator using Tera templates
pub struct Generator<'a> {
    blog: &'a Blog,
    renderer: TemplateRenderer,
    site_data: SiteData,
}

impl<'a> Generator<'a> {
    /// Create a new generator
    pub fn new(blog: &'a Blog) -> Result<Self> {
        let renderer = TemplateRenderer::new()?;
        let site_data = SiteData::from_config(&blog.config);

        Ok(Self {
            blog,
            renderer,
            site_data,
        })
    }

    /// Routes owned by built-in pages; posts may not claim them
    pub fn reserved_routes(&self) -> Vec<(String, &'static str)> {
        let mut routes = vec![("/".to_string(), "index"), ("/about/".to_string(), "about")];
        if self.blog.config.render_drafts {
            routes.push((self.blog.config.drafts_route(), "drafts"));
        }
        routes
    }

    /// Render and write the entire site
    pub fn generate(&self, posts: &PostSet) -> Result<RenderedSite> {
        let site = self.render(posts)?;
        self.write(&site)?;
        Ok(site)
    }

    /// Render every page in memory
    pub fn render(&self, posts: &PostSet) -> Result<RenderedSite> {
        let reserved = self.reserved_routes();
        let reserved: Vec<(&str, &str)> = reserved.iter().map(|(r, n)| (r.as_str(), *n)).collect();
        let routes = RouteTable::build(posts.all(), &reserved)?;

        let published = posts.published();
        let mut site = RenderedSite::default();

        site.pages.push(self.render_index(&published)?);
        site.pages.push(self.render_about()?);

        if self.blog.config.render_drafts {
            site.pages.push(self.render_drafts(&posts.drafts())?);
        }

        for post in &published {
            site.pages.push(self.render_post(&routes, &post.slug)?);
        }

        tracing::info!(
            "Rendered {} pages ({} published, {} drafts)",
            site.pages.len(),
            published.len(),
            posts.len() - published.len()
        );
        Ok(site)
    }

    /// Create a base context with common variables
    fn create_base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.site_data);
        context.insert("current_year", &chrono::Local::now().year().to_string());
        context.insert("page_title", "");
        context.insert("meta_description", &self.site_data.description);
        context.insert("meta_keywords", &self.site_data.keywords);
        context.insert("noindex", &false);
        context
    }

    /// Published posts, newest first
    fn render_index(&self, published: &[&Post]) -> Result<RenderedPage> {
        let listings: Vec<PostListingData> = published
            .iter()
            .map(|p| PostListingData::new(p, &self.blog.config))
            .collect();

        let mut context = self.create_base_context();
        context.insert("posts", &listings);

        let html = self
            .renderer
            .render("index.html", &context)
            .context("Failed to render index page")?;
        Ok(RenderedPage {
            route: "/".to_string(),
            html,
        })
    }

    /// Drafts, newest first, each in full; kept out of search engines
    fn render_drafts(&self, drafts: &[&Post]) -> Result<RenderedPage> {
        let drafts: Vec<DraftData> = drafts.iter().map(|p| DraftData::from(*p)).collect();

        let mut context = self.create_base_context();
        context.insert("page_title", "Drafts");
        context.insert("noindex", &true);
        context.insert("drafts", &drafts);

        let html = self
            .renderer
            .render("drafts.html", &context)
            .context("Failed to render drafts page")?;
        Ok(RenderedPage {
            route: self.blog.config.drafts_route(),
            html,
        })
    }

    fn render_about(&self) -> Result<RenderedPage> {
        let about_html = if self.blog.about_path.is_file() {
            let markdown = fs::read_to_string(&self.blog.about_path)
                .with_context(|| format!("Failed to read {:?}", self.blog.about_path))?;
            MarkdownRenderer::new().render(&markdown)
        } else {
            tracing::warn!(
                "About file {:?} not found, rendering an empty about page",
                self.blog.about_path
            );
            String::new()
        };

        let about_image = self
            .blog
            .config
            .about_image
            .as_deref()
            .map(|img| url_for(&self.blog.config, img))
            .unwrap_or_default();

        let mut context = self.create_base_context();
        context.insert("page_title", "About");
        context.insert("about_html", &about_html);
        context.insert("about_image", &about_image);

        let html = self
            .renderer
            .render("about.html", &context)
            .context("Failed to render about page")?;
        Ok(RenderedPage {
            route: "/about/".to_string(),
            html,
        })
    }

    /// Render the detail page of the post served at `slug`
    pub fn render_post(&self, routes: &RouteTable<'_>, slug: &str) -> Result<RenderedPage> {
        let post = routes.resolve(slug)?;

        let mut context = self.create_base_context();
        context.insert("page_title", &post.title);
        if !post.description.is_empty() {
            context.insert("meta_description", &post.description);
        }
        if !post.tags.is_empty() {
            context.insert("meta_keywords", &post.tags.join(", "));
        }
        context.insert("post", &PostDetailData::from(post));

        let html = self
            .renderer
            .render("post.html", &context)
            .with_context(|| format!("Failed to render post {:?}", post.source))?;
        Ok(RenderedPage {
            route: post.slug.clone(),
            html,
        })
    }

    /// Write a rendered site to the output directory, replacing its contents
    ///
    /// Fails before touching the disk when a static file has the same output
    /// path as a rendered page.
    pub fn write(&self, site: &RenderedSite) -> Result<()> {
        let assets = self.static_files()?;
        let page_paths: HashMap<PathBuf, &str> = site
            .pages
            .iter()
            .map(|p| (p.output_path(Path::new("")), p.route.as_str()))
            .collect();
        for (source, relative) in &assets {
            if let Some(route) = page_paths.get(relative) {
                return Err(BuildError::StaticConflict {
                    path: source.clone(),
                    route: route.to_string(),
                }
                .into());
            }
        }

        let staging = self.blog.staging_dir();
        if staging.exists() {
            fs::remove_dir_all(&staging)
                .with_context(|| format!("Failed to clear {:?}", staging))?;
        }
        fs::create_dir_all(&staging)?;

        for (source, relative) in &assets {
            let dest = staging.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(source, &dest)
                .with_context(|| format!("Failed to copy {:?} to {:?}", source, dest))?;
        }
        tracing::debug!("Copied {} static files", assets.len());

        for page in &site.pages {
            let output_path = page.output_path(&staging);
            if let Some(parent) = output_path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create dir {:?}", parent))?;
            }
            fs::write(&output_path, &page.html)
                .with_context(|| format!("Failed to write {:?}", output_path))?;
            tracing::debug!("Generated: {}", page.route);
        }

        let public_dir = &self.blog.public_dir;
        if public_dir.exists() {
            fs::remove_dir_all(public_dir)
                .with_context(|| format!("Failed to remove old output {:?}", public_dir))?;
        }
        fs::rename(&staging, public_dir)
            .with_context(|| format!("Failed to move {:?} to {:?}", staging, public_dir))?;

        tracing::info!("Wrote {} pages to {:?}", site.pages.len(), public_dir);
        Ok(())
    }

    /// Static assets (images, css, etc.) as `(source, path relative to the
    /// static dir)` pairs; they are copied verbatim
    fn static_files(&self) -> Result<Vec<(PathBuf, PathBuf)>> {
        let static_dir = &self.blog.static_dir;
        if !static_dir.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(static_dir).follow_links(true).sort_by_file_name() {
            let entry = entry.with_context(|| format!("Failed to walk {:?}", static_dir))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let relative = path.strip_prefix(static_dir)?.to_path_buf();
            files.push((path.to_path_buf(), relative));
        }
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn post(source: &str, date: (i32, u32, u32), published: bool) -> Post {
        let mut post = Post::new(
            format!("Post {}", source),
            NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            source,
        );
        post.published = published;
        post.html = format!("<p>body of {}</p>", source);
        post
    }

    fn blog() -> (tempfile::TempDir, Blog) {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        (dir, blog)
    }

    #[test]
    fn test_output_path() {
        let public = Path::new("public");
        let page = |route: &str| RenderedPage {
            route: route.to_string(),
            html: String::new(),
        };
        assert_eq!(page("/").output_path(public), public.join("index.html"));
        assert_eq!(
            page("/a/b/").output_path(public),
            public.join("a/b").join("index.html")
        );
    }

    #[test]
    fn test_render_site_pages() {
        let (_dir, blog) = blog();
        let generator = Generator::new(&blog).unwrap();
        let posts = PostSet::new(vec![
            post("old.md", (2023, 1, 1), true),
            post("new.md", (2024, 1, 1), true),
            post("wip.md", (2024, 6, 1), false),
        ]);

        let site = generator.render(&posts).unwrap();
        let routes: Vec<&str> = site.pages.iter().map(|p| p.route.as_str()).collect();
        assert_eq!(routes, vec!["/", "/about/", "/drafts/", "/new/", "/old/"]);

        let index = &site.page("/").unwrap().html;
        let new_pos = index.find("Post new.md").unwrap();
        let old_pos = index.find("Post old.md").unwrap();
        assert!(new_pos < old_pos);
        assert!(!index.contains("Post wip.md"));

        let drafts = &site.page("/drafts/").unwrap().html;
        assert!(drafts.contains("<p>body of wip.md</p>"));
        assert!(drafts.contains("noindex"));
        assert!(site.page("/wip/").is_none());
    }

    #[test]
    fn test_drafts_page_can_be_disabled() {
        let (_dir, mut blog) = blog();
        blog.config.render_drafts = false;
        let generator = Generator::new(&blog).unwrap();
        let posts = PostSet::new(vec![post("wip.md", (2024, 6, 1), false)]);

        let site = generator.render(&posts).unwrap();
        assert!(site.page("/drafts/").is_none());
    }

    #[test]
    fn test_render_unknown_post_fails() {
        let (_dir, blog) = blog();
        let generator = Generator::new(&blog).unwrap();
        let posts = PostSet::new(vec![post("one.md", (2024, 1, 1), true)]);
        let routes = RouteTable::build(posts.all(), &[]).unwrap();

        let err = generator.render_post(&routes, "/two/").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::PostNotFound(_))
        ));
    }

    #[test]
    fn test_render_duplicate_slug_fails() {
        let (_dir, blog) = blog();
        let generator = Generator::new(&blog).unwrap();
        let posts = PostSet::new(vec![
            post("Same Name.md", (2024, 1, 1), true),
            post("same-name.md", (2024, 1, 2), false),
        ]);

        let err = generator.render(&posts).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::SlugCollision { .. })
        ));
    }

    #[test]
    fn test_write_replaces_output() {
        let (_dir, blog) = blog();
        fs::create_dir_all(blog.public_dir.join("stale")).unwrap();
        fs::write(blog.public_dir.join("stale/index.html"), "old").unwrap();
        fs::create_dir_all(blog.static_dir.join("images")).unwrap();
        fs::write(blog.static_dir.join("images/logo.png"), [0u8, 1, 2]).unwrap();

        let generator = Generator::new(&blog).unwrap();
        let posts = PostSet::new(vec![post("hello.md", (2024, 1, 1), true)]);
        generator.generate(&posts).unwrap();

        assert!(blog.public_dir.join("index.html").is_file());
        assert!(blog.public_dir.join("hello/index.html").is_file());
        assert!(blog.public_dir.join("images/logo.png").is_file());
        assert!(!blog.public_dir.join("stale").exists());
        assert!(!blog.staging_dir().exists());
    }

    #[test]
    fn test_static_file_on_page_path_fails() {
        let (_dir, blog) = blog();
        fs::create_dir_all(blog.static_dir.join("about")).unwrap();
        fs::write(blog.static_dir.join("about/index.html"), "handmade").unwrap();

        let generator = Generator::new(&blog).unwrap();
        let err = generator.generate(&PostSet::default()).unwrap_err();
        match err.downcast_ref::<BuildError>() {
            Some(BuildError::StaticConflict { path, route }) => {
                assert_eq!(route, "/about/");
                assert_eq!(path, &blog.static_dir.join("about/index.html"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!blog.public_dir.exists());
        assert!(!blog.staging_dir().exists());
    }
}
