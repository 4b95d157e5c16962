//! List site content

use anyhow::Result;
use serde::Serialize;

use crate::content::Post;
use crate::generator::Generator;
use crate::helpers::{date_iso, full_url_for};
use crate::routes::{Route, RouteTable};
use crate::Blog;

#[derive(Debug, Serialize)]
struct PostEntry {
    title: String,
    date: String,
    slug: String,
    url: String,
    source: String,
    time_to_read: u32,
}

impl PostEntry {
    fn new(post: &Post, blog: &Blog) -> Self {
        Self {
            title: post.title.clone(),
            date: date_iso(&post.date),
            slug: post.slug.clone(),
            url: full_url_for(&blog.config, &post.slug),
            source: post.source.to_string_lossy().to_string(),
            time_to_read: post.time_to_read,
        }
    }
}

#[derive(Debug, Serialize)]
struct TagEntry<'a> {
    tag: &'a str,
    count: usize,
}

#[derive(Debug, Serialize)]
struct RouteEntry {
    route: String,
    target: String,
}

/// Print a listing of `content_type`
pub fn run(blog: &Blog, content_type: &str, json: bool) -> Result<()> {
    print!("{}", render(blog, content_type, json)?);
    Ok(())
}

/// Build the listing text for `content_type`: posts, drafts, tags or routes
pub fn render(blog: &Blog, content_type: &str, json: bool) -> Result<String> {
    let posts = blog.load_posts()?;
    let mut out = String::new();

    match content_type {
        "published" | "post" | "posts" | "drafts" | "draft" => {
            let (label, list) = if content_type.starts_with("draft") {
                ("Drafts", posts.drafts())
            } else {
                ("Posts", posts.published())
            };
            let entries: Vec<PostEntry> = list.iter().map(|p| PostEntry::new(p, blog)).collect();

            if json {
                out.push_str(&serde_json::to_string_pretty(&entries)?);
                out.push('\n');
            } else {
                out.push_str(&format!("{} ({}):\n", label, entries.len()));
                for entry in entries {
                    out.push_str(&format!(
                        "  {} - {} {} [{}]\n",
                        entry.date, entry.title, entry.slug, entry.source
                    ));
                }
            }
        }
        "tag" | "tags" => {
            let tags: Vec<TagEntry> = posts
                .tag_counts()
                .into_iter()
                .map(|(tag, count)| TagEntry { tag, count })
                .collect();

            if json {
                out.push_str(&serde_json::to_string_pretty(&tags)?);
                out.push('\n');
            } else {
                out.push_str(&format!("Tags ({}):\n", tags.len()));
                for entry in tags {
                    out.push_str(&format!("  {} ({})\n", entry.tag, entry.count));
                }
            }
        }
        "route" | "routes" => {
            let generator = Generator::new(blog)?;
            let reserved = generator.reserved_routes();
            let reserved: Vec<(&str, &str)> =
                reserved.iter().map(|(r, n)| (r.as_str(), *n)).collect();
            let table = RouteTable::build(posts.all(), &reserved)?;

            let routes: Vec<RouteEntry> = table
                .iter()
                .map(|(route, target)| RouteEntry {
                    route: route.to_string(),
                    target: match target {
                        Route::Page(name) => name.clone(),
                        Route::Post(post) => post.source.to_string_lossy().to_string(),
                    },
                })
                .collect();

            if json {
                out.push_str(&serde_json::to_string_pretty(&routes)?);
                out.push('\n');
            } else {
                out.push_str(&format!("Routes ({}):\n", routes.len()));
                for entry in routes {
                    out.push_str(&format!("  {} -> {}\n", entry.route, entry.target));
                }
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: published, drafts, tags, routes",
                content_type
            );
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn blog() -> (tempfile::TempDir, Blog) {
        let dir = tempfile::tempdir().unwrap();
        let posts = dir.path().join("posts");
        fs::create_dir_all(&posts).unwrap();
        fs::write(
            posts.join("live.md"),
            "---\ntitle: Live\ndate: 2024-01-01\npublished: true\ntags: [rust]\n---\nHi\n",
        )
        .unwrap();
        fs::write(
            posts.join("wip.md"),
            "---\ntitle: WIP\ndate: 2024-01-02\ntags: [secret]\n---\nSoon\n",
        )
        .unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        (dir, blog)
    }

    #[test]
    fn test_list_published_and_drafts() {
        let (_dir, blog) = blog();
        let published = render(&blog, "published", false).unwrap();
        assert!(published.starts_with("Posts (1):"));
        assert!(published.contains("2024-01-01 - Live /live/ [live.md]"));

        let drafts = render(&blog, "drafts", false).unwrap();
        assert!(drafts.starts_with("Drafts (1):"));
        assert!(drafts.contains("WIP"));
    }

    #[test]
    fn test_list_json() {
        let (_dir, blog) = blog();
        let out = render(&blog, "published", true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["title"], "Live");
        assert_eq!(value[0]["url"], "http://localhost:8000/live/");
    }

    #[test]
    fn test_list_tags_counts_published_only() {
        let (_dir, blog) = blog();
        let out = render(&blog, "tags", false).unwrap();
        assert!(out.contains("rust (1)"));
        assert!(!out.contains("secret"));
    }

    #[test]
    fn test_list_routes() {
        let (_dir, blog) = blog();
        let out = render(&blog, "routes", false).unwrap();
        assert!(out.contains("/ -> index"));
        assert!(out.contains("/drafts/ -> drafts"));
        assert!(out.contains("/live/ -> live.md"));
        assert!(out.contains("/wip/ -> wip.md"));
    }

    #[test]
    fn test_list_unknown_type() {
        let (_dir, blog) = blog();
        assert!(render(&blog, "categories", false).is_err());
    }
}
