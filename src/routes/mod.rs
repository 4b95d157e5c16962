//! Slug routing
//!
//! Maps post source paths to URL paths and resolves URL paths back to posts.
//! Every route in a build is claimed exactly once; a second claim fails the
//! build instead of overwriting the first.

use indexmap::IndexMap;
use std::path::{Component, Path};

use crate::content::Post;
use crate::error::BuildError;

/// Derive the URL path of a post from its path relative to the content dir
///
/// `hello-world.md` becomes `/hello-world/`, `2019/trip/index.md` becomes
/// `/2019/trip/`. Each component is slugified.
pub fn resolve_slug(source: &Path) -> String {
    let without_ext = source.with_extension("");
    let mut parts: Vec<String> = without_ext
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(slug::slugify(s.to_string_lossy())),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .collect();

    if parts.last().is_some_and(|p| p == "index") {
        parts.pop();
    }

    if parts.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", parts.join("/"))
    }
}

/// Normalize a route to the `/a/b/` form
pub fn normalize_route(route: &str) -> String {
    let trimmed = route.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}

/// What a route points at
#[derive(Debug, Clone)]
pub enum Route<'a> {
    /// A built-in page such as the index or about page
    Page(String),
    /// A post detail page
    Post(&'a Post),
}

impl Route<'_> {
    fn describe(&self) -> String {
        match self {
            Route::Page(name) => format!("the built-in {} page", name),
            Route::Post(post) => format!("{:?}", post.source),
        }
    }
}

/// Collision-free mapping from route to page or post
#[derive(Debug)]
pub struct RouteTable<'a> {
    routes: IndexMap<String, Route<'a>>,
}

impl<'a> RouteTable<'a> {
    /// Register the built-in pages, then every post.
    ///
    /// `reserved` holds `(route, page name)` pairs. Fails with
    /// [`BuildError::SlugCollision`] on the first route claimed twice.
    pub fn build(
        posts: impl IntoIterator<Item = &'a Post>,
        reserved: &[(&str, &str)],
    ) -> Result<Self, BuildError> {
        let mut table = Self {
            routes: IndexMap::new(),
        };

        for (route, name) in reserved {
            table.insert(normalize_route(route), Route::Page(name.to_string()))?;
        }
        for post in posts {
            table.insert(normalize_route(&post.slug), Route::Post(post))?;
        }

        tracing::debug!("Route table holds {} routes", table.routes.len());
        Ok(table)
    }

    fn insert(&mut self, route: String, target: Route<'a>) -> Result<(), BuildError> {
        if let Some(existing) = self.routes.get(&route) {
            return Err(BuildError::SlugCollision {
                slug: route,
                first: existing.describe(),
                second: target.describe(),
            });
        }
        self.routes.insert(route, target);
        Ok(())
    }

    /// Look up the post served at `slug`
    pub fn resolve(&self, slug: &str) -> Result<&'a Post, BuildError> {
        let route = normalize_route(slug);
        match self.routes.get(&route) {
            Some(Route::Post(post)) => Ok(*post),
            _ => Err(BuildError::PostNotFound(route)),
        }
    }

    /// All routes, in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Route<'a>)> {
        self.routes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
