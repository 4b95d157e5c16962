//! Generate static files

use anyhow::Result;
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};

use crate::generator::Generator;
use crate::Blog;

/// Summary of one build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub published: usize,
    pub drafts: usize,
    pub pages: usize,
}

/// Load the posts, render every page, and replace the output directory
pub fn run(blog: &Blog) -> Result<BuildReport> {
    let start = Instant::now();

    let posts = blog.load_posts()?;
    tracing::info!("Loaded {} posts", posts.len());

    let generator = Generator::new(blog)?;
    let site = generator.generate(&posts)?;

    let report = BuildReport {
        published: posts.published().len(),
        drafts: posts.drafts().len(),
        pages: site.pages.len(),
    };

    tracing::info!("Generated in {:.2}s", start.elapsed().as_secs_f64());
    Ok(report)
}

/// Re-open the blog so `site.yml` edits are picked up, then build
pub fn rebuild(base_dir: &Path) -> Result<BuildReport> {
    let blog = Blog::new(base_dir)?;
    run(&blog)
}

/// Paths whose changes require a rebuild, with their watch mode
pub fn watched_paths(blog: &Blog) -> Vec<(PathBuf, RecursiveMode)> {
    let candidates = [
        (blog.content_dir.clone(), RecursiveMode::Recursive),
        (blog.static_dir.clone(), RecursiveMode::Recursive),
        (blog.base_dir.join(crate::config::CONFIG_FILE), RecursiveMode::NonRecursive),
        (blog.about_path.clone(), RecursiveMode::NonRecursive),
    ];
    candidates
        .into_iter()
        .filter(|(path, _)| path.exists())
        .collect()
}

/// Editor swap files and VCS metadata do not trigger rebuilds
pub fn is_relevant_change(path: &Path) -> bool {
    let path_str = path.to_string_lossy();
    !path_str.contains(".git")
        && !path_str.contains(".DS_Store")
        && !path_str.ends_with('~')
        && !path_str.ends_with(".swp")
}

/// Watch for file changes and regenerate, calling `on_rebuild` after every
/// successful rebuild
///
/// A failed rebuild is logged and the previous output stays in place.
pub fn watch<F>(blog: &Blog, mut on_rebuild: F) -> Result<()>
where
    F: FnMut(&BuildReport),
{
    let (tx, rx) = channel();
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    for (path, mode) in watched_paths(blog) {
        debouncer.watcher().watch(&path, mode)?;
        tracing::debug!("Watching: {:?}", path);
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    for result in rx {
        match result {
            Ok(events) => {
                let paths: Vec<PathBuf> = events.into_iter().map(|e| e.path).collect();
                handle_changes(&blog.base_dir, &paths, &mut on_rebuild);
            }
            Err(e) => tracing::error!("Watch error: {:?}", e),
        }
    }

    Ok(())
}

/// Rebuild after one debounced batch of changed paths. Returns whether a
/// rebuild succeeded; `on_rebuild` runs only then.
fn handle_changes<F>(base_dir: &Path, paths: &[PathBuf], on_rebuild: &mut F) -> bool
where
    F: FnMut(&BuildReport),
{
    let changed: Vec<&PathBuf> = paths.iter().filter(|p| is_relevant_change(p)).collect();
    if changed.is_empty() {
        return false;
    }

    for path in &changed {
        tracing::info!("File changed: {}", path.display());
    }

    match rebuild(base_dir) {
        Ok(report) => {
            tracing::info!(
                "Regenerated {} pages ({} published, {} drafts)",
                report.pages,
                report.published,
                report.drafts
            );
            on_rebuild(&report);
            true
        }
        Err(e) => {
            tracing::error!("Generation failed, keeping previous output: {:#}", e);
            false
        }
    }
}
