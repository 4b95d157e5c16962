//! Front-matter parsing

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::path::Path;

use crate::error::BuildError;

/// Front-matter data from a post
///
/// Fields are optional at the YAML level so that absence can be told apart
/// from a wrong type: a missing `published` means draft, while
/// `published: "yes"` is a hard error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub published: Option<bool>,
    pub date: Option<String>,
}

impl FrontMatter {
    /// Split a source file into front-matter and markdown body.
    ///
    /// A file without a leading `---` line has empty front-matter. An opening
    /// delimiter without a closing one, or YAML that does not match the
    /// expected field types, is an error naming `path`.
    pub fn parse<'a>(path: &Path, content: &'a str) -> Result<(Self, &'a str), BuildError> {
        let content = content.trim_start_matches('\u{feff}');
        let Some(rest) = strip_opening_delimiter(content) else {
            return Ok((FrontMatter::default(), content));
        };

        let mut offset = 0;
        for line in rest.split_inclusive('\n') {
            if line.trim_end() == "---" {
                let yaml = &rest[..offset];
                let body = &rest[offset + line.len()..];

                if yaml.trim().is_empty() {
                    return Ok((FrontMatter::default(), body));
                }

                let fm = serde_yaml::from_str::<FrontMatter>(yaml).map_err(|e| {
                    BuildError::InvalidFrontMatter {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    }
                })?;
                return Ok((fm, body));
            }
            offset += line.len();
        }

        Err(BuildError::InvalidFrontMatter {
            path: path.to_path_buf(),
            message: "front-matter block is never closed with `---`".to_string(),
        })
    }

    /// The post date. Absent or unparseable dates fail the build.
    pub fn parse_date(&self, path: &Path) -> Result<NaiveDate, BuildError> {
        let value = self.date.as_deref().ok_or_else(|| BuildError::MissingDate {
            path: path.to_path_buf(),
        })?;

        parse_date_string(value).ok_or_else(|| BuildError::InvalidDate {
            path: path.to_path_buf(),
            value: value.to_string(),
        })
    }

    /// Whether the post is published; absent means draft
    pub fn is_published(&self) -> bool {
        self.published.unwrap_or(false)
    }
}

fn strip_opening_delimiter(content: &str) -> Option<&str> {
    let line_end = content.find('\n')?;
    if content[..line_end].trim_end() == "---" {
        Some(&content[line_end + 1..])
    } else {
        None
    }
}

/// Parse a date string in various formats, keeping only the calendar date
fn parse_date_string(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    // RFC 3339 / ISO 8601 with offset
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}
