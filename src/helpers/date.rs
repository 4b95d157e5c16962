//! Date helper functions

use chrono::{Datelike, NaiveDate};

/// Moment.js tokens we understand, longest first so that `MMMM` wins over `MM`
const TOKENS: [&str; 11] = [
    "YYYY", "MMMM", "dddd", "MMM", "ddd", "YY", "MM", "Do", "DD", "M", "D",
];

/// Format a date using a Moment.js-compatible format string
///
/// Text inside `[...]` is copied literally.
///
/// # Examples
/// ```ignore
/// format_date(&date, "MMMM Do YYYY") // -> "March 1st 2024"
/// ```
pub fn format_date(date: &NaiveDate, format: &str) -> String {
    let mut out = String::with_capacity(format.len() + 8);
    let mut rest = format;

    while !rest.is_empty() {
        if let Some(literal) = rest.strip_prefix('[') {
            let end = literal.find(']').unwrap_or(literal.len());
            out.push_str(&literal[..end]);
            rest = literal.get(end + 1..).unwrap_or("");
            continue;
        }

        if let Some(token) = TOKENS.iter().find(|t| rest.starts_with(**t)) {
            out.push_str(&render_token(date, token));
            rest = &rest[token.len()..];
            continue;
        }

        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }

    out
}

fn render_token(date: &NaiveDate, token: &str) -> String {
    match token {
        "YYYY" => date.format("%Y").to_string(),
        "YY" => date.format("%y").to_string(),
        "MMMM" => date.format("%B").to_string(),
        "MMM" => date.format("%b").to_string(),
        "MM" => date.format("%m").to_string(),
        "M" => date.month().to_string(),
        "Do" => ordinal(date.day()),
        "DD" => date.format("%d").to_string(),
        "D" => date.day().to_string(),
        "dddd" => date.format("%A").to_string(),
        "ddd" => date.format("%a").to_string(),
        _ => token.to_string(),
    }
}

/// English ordinal for a day of month: 1st, 2nd, 3rd, 4th, 11th, 22nd...
pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

/// Format a date as `YYYY-MM-DD`
pub fn date_iso(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_format_date() {
        let d = date(2024, 1, 15);
        assert_eq!(format_date(&d, "YYYY-MM-DD"), "2024-01-15");
        assert_eq!(format_date(&d, "YYYY/MM/DD"), "2024/01/15");
        assert_eq!(format_date(&d, "MMMM Do YYYY"), "January 15th 2024");
        assert_eq!(format_date(&d, "MMM D, YY"), "Jan 15, 24");
        assert_eq!(format_date(&d, "dddd"), "Monday");
    }

    #[test]
    fn test_format_date_literal() {
        let d = date(2024, 3, 1);
        assert_eq!(format_date(&d, "[Posted] MMMM Do"), "Posted March 1st");
    }

    #[test]
    fn test_ordinal() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(12), "12th");
        assert_eq!(ordinal(13), "13th");
        assert_eq!(ordinal(21), "21st");
        assert_eq!(ordinal(22), "22nd");
        assert_eq!(ordinal(31), "31st");
    }

    #[test]
    fn test_date_iso() {
        assert_eq!(date_iso(&date(2019, 3, 9)), "2019-03-09");
    }
}
