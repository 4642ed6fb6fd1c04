//! Math rendering to MathML.
//!
//! Two entry points share one converter: [`render_dollar_math`] handles
//! `$...$` and `$$...$$` delimiters left in already rendered HTML (GitHub's
//! `bodyHTML`), and [`render_math_spans`] handles the math spans comrak emits
//! when its dollar math extension is enabled.

use latex2mathml::{DisplayStyle, latex_to_mathml};
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

use crate::util::decode_html_entities;

/// Elements whose content must never be treated as math.
static PROTECTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<pre\b[^>]*>.*?</pre\s*>|<code\b[^>]*>.*?</code\s*>")
        .expect("protected element pattern is valid")
});

/// Block math first so `$$` pairs never split into two inline spans.
/// Inline math stops at markup, leaving the closing `$` free to open a
/// later span.
static DOLLAR_MATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\$\$(.+?)\$\$|\$([^$\n<>]+?)\$").expect("dollar math pattern is valid")
});

static MATH_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<span data-math-style="(inline|display)"[^>]*>(.*?)</span>"#)
        .expect("math span pattern is valid")
});

/// Display mode of a math expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathMode {
    Inline,
    Block,
}

impl MathMode {
    fn css_class(self) -> &'static str {
        match self {
            MathMode::Inline => "math math-inline",
            MathMode::Block => "math math-display",
        }
    }

    fn display_style(self) -> DisplayStyle {
        match self {
            MathMode::Inline => DisplayStyle::Inline,
            MathMode::Block => DisplayStyle::Block,
        }
    }
}

/// Converts a LaTeX expression into wrapped MathML markup.
///
/// The expression may contain HTML entities (it usually comes out of an HTML
/// document) and is decoded before conversion.
///
/// # Returns
///
/// `<span class="math ...">` wrapping the MathML, or `None` when the
/// expression is blank or the converter rejects it.
pub fn render_expression(expr: &str, mode: MathMode) -> Option<String> {
    let latex = decode_html_entities(expr.trim());
    if latex.is_empty() {
        return None;
    }

    match latex_to_mathml(&latex, mode.display_style()) {
        Ok(mathml) => Some(format!(
            "<span class=\"{}\">{}</span>",
            mode.css_class(),
            mathml
        )),
        Err(e) => {
            tracing::debug!(expression = %latex, error = %e, "Leaving math expression unrendered");
            None
        }
    }
}

/// Replaces dollar delimited math in HTML with MathML.
///
/// `$$...$$` becomes block math and `$...$` (single line) inline math.
/// Content of `<pre>` and `<code>` elements is copied untouched, and a
/// delimiter pair never spans across one of them. Inline math never
/// contains markup, so it cannot cross element boundaries.
pub fn render_dollar_math(html: &str) -> String {
    if !html.contains('$') {
        return html.to_string();
    }

    let mut result = String::with_capacity(html.len());
    let mut last_end = 0;

    for protected in PROTECTED.find_iter(html) {
        result.push_str(&replace_dollars(&html[last_end..protected.start()]));
        result.push_str(protected.as_str());
        last_end = protected.end();
    }

    result.push_str(&replace_dollars(&html[last_end..]));
    result
}

fn replace_dollars(text: &str) -> Cow<'_, str> {
    if !text.contains('$') {
        return Cow::Borrowed(text);
    }

    DOLLAR_MATH.replace_all(text, |caps: &Captures| {
        let rendered = match (caps.get(1), caps.get(2)) {
            (Some(block), _) => render_expression(block.as_str(), MathMode::Block),
            (None, Some(inline)) => render_expression(inline.as_str(), MathMode::Inline),
            _ => None,
        };
        rendered.unwrap_or_else(|| caps[0].to_string())
    })
}

/// Replaces comrak math spans with MathML.
///
/// Expects `<span data-math-style="inline|display">` elements with escaped
/// LaTeX content. Expressions the converter rejects keep their original span.
pub fn render_math_spans(html: &str) -> String {
    if !html.contains("data-math-style") {
        return html.to_string();
    }

    MATH_SPAN
        .replace_all(html, |caps: &Captures| {
            let mode = if &caps[1] == "display" {
                MathMode::Block
            } else {
                MathMode::Inline
            };
            render_expression(&caps[2], mode).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
