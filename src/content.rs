//! Normalization of post and comment bodies for display.
//!
//! GitHub renders the frontmatter header of a discussion body as ordinary
//! content, usually a paragraph or a code block at the very top. The
//! normalizer removes that block first and then renders math, so the
//! header's dashes are never mistaken for math delimiters.

use anyhow::Result;
use regex::Regex;
use std::sync::LazyLock;

use crate::frontmatter;
use crate::markdown::{MarkdownRenderer, render_dollar_math};

static LEADING_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*<(pre|code|p)\b[^>]*>").expect("leading block pattern is valid")
});

static DELIMITED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)---.*---").expect("delimiter pattern is valid"));

/// Removes a rendered frontmatter block from the top of an HTML document.
///
/// The first element must be a `<p>`, `<code>` or `<pre>` whose content
/// holds two `---` delimiters. This is pattern matching, not parsing: HTML
/// that does not start with such a block is returned unchanged, which also
/// makes the function idempotent on its own output.
///
/// # Arguments
///
/// * `html`: Server rendered body HTML
///
/// # Returns
///
/// The HTML after the stripped block and one trailing newline
pub fn strip_frontmatter_html(html: &str) -> &str {
    let Some(open) = LEADING_BLOCK.captures(html) else {
        return html;
    };
    let (Some(tag), Some(whole)) = (open.get(1), open.get(0)) else {
        return html;
    };

    let close = format!("</{}>", tag.as_str().to_ascii_lowercase());
    let body_start = whole.end();

    // ASCII lowercasing keeps byte offsets intact
    let Some(body_len) = html[body_start..].to_ascii_lowercase().find(&close) else {
        return html;
    };

    let inner = &html[body_start..body_start + body_len];
    if !DELIMITED.is_match(inner) {
        return html;
    }

    let rest = &html[body_start + body_len + close.len()..];
    rest.strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest)
}

/// Normalizes GitHub rendered body HTML for display.
///
/// Strips a leading frontmatter block, then replaces dollar math with
/// MathML outside code elements.
pub fn process_body_html(html: &str) -> String {
    render_dollar_math(strip_frontmatter_html(html))
}

/// Renders a raw Markdown body for display.
///
/// The frontmatter header is removed with the parser before rendering, so
/// no HTML stripping is needed on this path.
///
/// # Errors
///
/// Returns error if the renderer fails to highlight a code block
pub fn process_markdown(renderer: &MarkdownRenderer, markdown: &str) -> Result<String> {
    let (_, content) = frontmatter::parse(markdown);
    renderer.render(content)
}
