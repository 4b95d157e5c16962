//! Content module - posts, front-matter, and listing queries

mod frontmatter;
pub mod loader;
mod markdown;
mod post;
pub mod query;

pub use frontmatter::FrontMatter;
pub use markdown::MarkdownRenderer;
pub use post::Post;
pub use query::PostSet;
