//! Build errors
//!
//! Every variant is fatal: the build stops and nothing is written to the
//! output directory.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Invalid front-matter in {path:?}: {message}")]
    InvalidFrontMatter { path: PathBuf, message: String },

    #[error("Missing `date` in front-matter of {path:?}")]
    MissingDate { path: PathBuf },

    #[error("Invalid date {value:?} in {path:?}")]
    InvalidDate { path: PathBuf, value: String },

    #[error("Slug {slug} is claimed by both {first} and {second}")]
    SlugCollision {
        slug: String,
        first: String,
        second: String,
    },

    #[error("Static file {path:?} would overwrite the page at {route}")]
    StaticConflict { path: PathBuf, route: String },

    #[error("No post found for slug {0}")]
    PostNotFound(String),
}
