//! Create a new post

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::generator::Generator;
use crate::routes::resolve_slug;
use crate::Blog;

/// Front-matter written into a freshly scaffolded post
#[derive(Debug, Serialize)]
struct Scaffold<'a> {
    title: &'a str,
    date: String,
    description: &'a str,
    tags: Vec<String>,
    published: bool,
}

/// Create `<content_dir>/<slug>.md` dated today. New posts are drafts unless
/// `published` is set.
pub fn run(blog: &Blog, title: &str, published: bool) -> Result<PathBuf> {
    let slug = slug::slugify(title);
    if slug.is_empty() {
        anyhow::bail!("Title {:?} does not produce a usable file name", title);
    }

    let file_name = format!("{}.md", slug);
    let route = resolve_slug(Path::new(&file_name));
    let reserved = Generator::new(blog)?.reserved_routes();
    if let Some((_, page)) = reserved.iter().find(|(r, _)| *r == route) {
        anyhow::bail!(
            "Title {:?} would publish at {}, which belongs to the built-in {} page",
            title,
            route,
            page
        );
    }

    let file_path = blog.content_dir.join(file_name);
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let scaffold = Scaffold {
        title,
        date: chrono::Local::now().format("%Y-%m-%d").to_string(),
        description: "",
        tags: Vec::new(),
        published,
    };
    let front_matter = serde_yaml::to_string(&scaffold)?;
    let content = format!("---\n{}---\n\n", front_matter);

    fs::create_dir_all(&blog.content_dir)
        .with_context(|| format!("Failed to create {:?}", blog.content_dir))?;
    fs::write(&file_path, content).with_context(|| format!("Failed to write {:?}", file_path))?;

    tracing::info!("Created: {:?}", file_path);
    Ok(file_path)
}
