//! Site configuration (site.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::helpers::collapse_whitespace;

/// Name of the configuration file at the site root
pub const CONFIG_FILE: &str = "site.yml";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub contact_email: String,
    pub keywords: Vec<String>,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub content_dir: String,
    pub static_dir: String,
    pub public_dir: String,
    pub drafts_dir: String,
    pub about_file: String,
    pub about_image: Option<String>,

    // Writing
    pub render_drafts: bool,
    pub date_format: String,
    pub excerpt_length: usize,
    pub words_per_minute: usize,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "The Irie Dev".to_string(),
            description: String::new(),
            author: String::new(),
            contact_email: String::new(),
            keywords: Vec::new(),
            language: "en".to_string(),

            url: "http://localhost:8000".to_string(),
            root: "/".to_string(),

            content_dir: "posts".to_string(),
            static_dir: "static".to_string(),
            public_dir: "public".to_string(),
            drafts_dir: "drafts".to_string(),
            about_file: "about.md".to_string(),
            about_image: None,

            render_drafts: true,
            date_format: "MMMM Do YYYY".to_string(),
            excerpt_length: 140,
            words_per_minute: 265,
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {:?}", path))
    }

    /// Parse configuration from YAML text
    pub fn parse(yaml: &str) -> Result<Self> {
        let mut config: SiteConfig = if yaml.trim().is_empty() {
            SiteConfig::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.description = collapse_whitespace(&config.description);
        if config.words_per_minute == 0 {
            anyhow::bail!("words_per_minute must be greater than zero");
        }
        Ok(config)
    }

    /// Route of the drafts listing, e.g. `/drafts/`
    pub fn drafts_route(&self) -> String {
        format!("/{}/", self.drafts_dir.trim_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.content_dir, "posts");
        assert!(config.render_drafts);
        assert_eq!(config.excerpt_length, 140);
        assert_eq!(config.drafts_route(), "/drafts/");
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: The Irie Dev
contact_email: someone@example.com
keywords:
  - blog
  - caribbean
description: >
  The Irie Dev is a general blog about software
      development and random interesting things
"#;
        let config = SiteConfig::parse(yaml).unwrap();
        assert_eq!(config.title, "The Irie Dev");
        assert_eq!(config.contact_email, "someone@example.com");
        assert_eq!(config.keywords, vec!["blog", "caribbean"]);
        assert_eq!(
            config.description,
            "The Irie Dev is a general blog about software development and random interesting things"
        );
        assert_eq!(config.public_dir, "public");
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = SiteConfig::parse("").unwrap();
        assert_eq!(config.title, SiteConfig::default().title);
    }

    #[test]
    fn test_zero_words_per_minute_rejected() {
        assert!(SiteConfig::parse("words_per_minute: 0").is_err());
    }

    #[test]
    fn test_drafts_route_trims_slashes() {
        let config = SiteConfig::parse("drafts_dir: /preview/").unwrap();
        assert_eq!(config.drafts_route(), "/preview/");
    }
}
