//! Listing queries over the post collection

use serde::Serialize;

use super::Post;

/// The complete, immutable post collection of one build, in source order
#[derive(Debug, Clone, Default, Serialize)]
pub struct PostSet {
    posts: Vec<Post>,
}

impl PostSet {
    pub fn new(posts: Vec<Post>) -> Self {
        Self { posts }
    }

    /// Every post, in source order
    pub fn all(&self) -> &[Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Published posts, newest first
    pub fn published(&self) -> Vec<&Post> {
        newest_first(self.posts.iter().filter(|p| p.published))
    }

    /// Unpublished posts, newest first
    pub fn drafts(&self) -> Vec<&Post> {
        newest_first(self.posts.iter().filter(|p| !p.published))
    }

    /// Distinct tags across all published posts with their post counts,
    /// in order of first appearance
    pub fn tag_counts(&self) -> Vec<(&str, usize)> {
        let mut counts: indexmap::IndexMap<&str, usize> = indexmap::IndexMap::new();
        for post in self.published() {
            for tag in &post.tags {
                *counts.entry(tag.as_str()).or_insert(0) += 1;
            }
        }
        counts.into_iter().collect()
    }
}

/// Sort by date descending. The sort is stable, so posts sharing a date keep
/// their source order.
fn newest_first<'a>(posts: impl Iterator<Item = &'a Post>) -> Vec<&'a Post> {
    let mut sorted: Vec<&Post> = posts.collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted
}
