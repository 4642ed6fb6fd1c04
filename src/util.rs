//! Utility functions for threadpress

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Shown when neither the frontmatter nor the discussion carries a usable date.
pub const UNKNOWN_DATE: &str = "Unknown date";

static NUMERIC_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&#(?:(\d+)|[xX]([0-9a-fA-F]+));").expect("numeric entity pattern is valid")
});

/// Formats a post date for display
///
/// Prefers the frontmatter `date` and falls back to the discussion creation
/// timestamp when the frontmatter value is absent or unparseable. Accepts
/// RFC 3339 timestamps, `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` and `YYYYMMDD`.
///
/// # Arguments
///
/// * `frontmatter_date`: Value of the `date` frontmatter key, if any
/// * `created_at`: Discussion creation timestamp, if any
///
/// # Returns
///
/// Date formatted like "October 19, 2026", or [`UNKNOWN_DATE`]
pub fn display_date(frontmatter_date: Option<&str>, created_at: Option<&str>) -> String {
    frontmatter_date
        .and_then(parse_date)
        .or_else(|| created_at.and_then(parse_date))
        .map(|date| date.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|| UNKNOWN_DATE.to_string())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.date_naive());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(timestamp) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(timestamp.date());
    }

    // Compact YYYYMMDD, split by hand since %Y consumes every digit
    if raw.len() == 8 && raw.bytes().all(|b| b.is_ascii_digit()) {
        let year = raw[0..4].parse().ok()?;
        let month = raw[4..6].parse().ok()?;
        let day = raw[6..8].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    None
}

/// Escapes HTML special characters.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Decodes the HTML entities produced by Markdown renderers.
///
/// Handles numeric references (decimal and hex) plus the named entities for
/// `<`, `>`, `"`, `'` and `&`. `&amp;` is decoded last so that an escaped
/// entity such as `&amp;lt;` decodes exactly once.
pub fn decode_html_entities(html: &str) -> String {
    let numeric = NUMERIC_ENTITY.replace_all(html, |caps: &Captures| {
        let code = match (caps.get(1), caps.get(2)) {
            (Some(dec), _) => dec.as_str().parse::<u32>().ok(),
            (None, Some(hex)) => u32::from_str_radix(hex.as_str(), 16).ok(),
            (None, None) => None,
        };
        code.and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });

    numeric
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
