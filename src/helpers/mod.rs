//! Helper functions for templates and the content pipeline

mod date;
mod text;
mod url;

pub use date::*;
pub use text::*;
pub use url::*;
