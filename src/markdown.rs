//! Markdown rendering with GitHub Flavored Markdown support.
//!
//! This module provides markdown rendering using comrak with GFM extensions
//! (tables, strikethrough, autolinks, task lists), syntect code highlighting
//! and LaTeX math converted to MathML.

pub mod math;
mod renderer;

pub use math::{MathMode, render_dollar_math, render_math_spans};
pub use renderer::MarkdownRenderer;
