//! Blog posts derived from discussions.

use anyhow::Result;
use serde::Serialize;

use crate::content::{process_body_html, process_markdown};
use crate::frontmatter::{self, Frontmatter};
use crate::github::{Author, Category, Discussion, Label};
use crate::markdown::MarkdownRenderer;
use crate::util::display_date;

/// Discussion normalized for display.
///
/// `body` is the raw Markdown with the frontmatter removed. `tags` is the
/// frontmatter tags followed by label names, without duplicates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub body: String,
    #[serde(rename = "bodyHTML")]
    pub body_html: String,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub display_date: String,
    pub author: Option<Author>,
    pub category: Option<Category>,
    pub labels: Vec<Label>,
    pub tags: Vec<String>,
    pub comment_count: usize,
    pub frontmatter: Frontmatter,
}

impl Post {
    /// Normalizes a discussion.
    ///
    /// GitHub's `bodyHTML` is used when present, with the rendered
    /// frontmatter block stripped and math converted. Otherwise the body is
    /// rendered locally with `renderer`.
    ///
    /// # Errors
    ///
    /// Returns error if local rendering fails
    pub fn from_discussion(discussion: Discussion, renderer: &MarkdownRenderer) -> Result<Self> {
        let (frontmatter, content) = frontmatter::parse(&discussion.body);

        let body_html = if discussion.body_html.trim().is_empty() {
            process_markdown(renderer, &discussion.body)?
        } else {
            process_body_html(&discussion.body_html)
        };

        let slug = frontmatter
            .slug()
            .map_or_else(|| discussion.id.clone(), String::from);
        let labels = discussion.labels.nodes;
        let tags = merge_tags(frontmatter.tags(), &labels);
        let display_date = display_date(frontmatter.date(), Some(&discussion.created_at));
        let body = content.to_string();

        Ok(Self {
            id: discussion.id,
            title: discussion.title,
            slug,
            body,
            body_html,
            created_at: discussion.created_at,
            updated_at: discussion.updated_at,
            display_date,
            author: discussion.author,
            category: discussion.category,
            labels,
            tags,
            comment_count: discussion.comments.total_count,
            frontmatter,
        })
    }

    /// Case-sensitive exact match against the merged tag set.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|candidate| candidate == tag)
    }

    /// Case-insensitive substring match on title, body and tags.
    ///
    /// `needle` must already be lowercased.
    pub fn matches_search(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.body.to_lowercase().contains(needle)
            || self
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(needle))
    }

    pub fn in_category(&self, category_id: &str) -> bool {
        self.category
            .as_ref()
            .is_some_and(|category| category.id == category_id)
    }

    /// Whether `key` addresses this post, by slug or by discussion id.
    pub fn is_addressed_by(&self, key: &str) -> bool {
        self.slug == key || self.id == key
    }
}

/// Frontmatter tags first, then label names, first occurrence kept.
pub fn merge_tags(frontmatter_tags: &[String], labels: &[Label]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::with_capacity(frontmatter_tags.len() + labels.len());
    let candidates = frontmatter_tags
        .iter()
        .map(String::as_str)
        .chain(labels.iter().map(|label| label.name.as_str()));
    for tag in candidates {
        if !tags.iter().any(|existing| existing == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}
