//! Clean the public directory

use anyhow::{Context, Result};
use std::fs;

use crate::Blog;

/// Remove the output directory and any staging directory left by an
/// interrupted build
pub fn run(blog: &Blog) -> Result<()> {
    for dir in [blog.public_dir.clone(), blog.staging_dir()] {
        if dir.exists() {
            fs::remove_dir_all(&dir).with_context(|| format!("Failed to delete {:?}", dir))?;
            tracing::info!("Deleted: {:?}", dir);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_removes_output_and_staging() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        fs::create_dir_all(blog.public_dir.join("hello")).unwrap();
        fs::create_dir_all(blog.staging_dir()).unwrap();

        run(&blog).unwrap();
        assert!(!blog.public_dir.exists());
        assert!(!blog.staging_dir().exists());

        // Nothing left to clean is fine
        run(&blog).unwrap();
    }
}
