//! Filtering and pagination of fetched posts.

use serde::{Deserialize, Deserializer, Serialize};

use crate::post::Post;

/// Upper bound for the page size a client may request.
pub const MAX_PER_PAGE: usize = 100;

/// Query string of the post listing endpoint.
///
/// Empty values count as absent, so `?tag=` does not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingQuery {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
    #[serde(default, deserialize_with = "non_empty")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub tag: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub search: Option<String>,
}

impl ListingQuery {
    /// 1-based page; 0 reads as 1.
    pub fn page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }

    /// Requested page size clamped to `1..=MAX_PER_PAGE`, or the default.
    pub fn per_page(&self, default: usize) -> usize {
        self.per_page
            .filter(|per_page| *per_page > 0)
            .unwrap_or(default)
            .clamp(1, MAX_PER_PAGE)
    }
}

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty()))
}

/// One page of a filtered list.
///
/// `total_count` counts the filtered list before slicing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPage<T> {
    pub nodes: Vec<T>,
    pub total_count: usize,
    pub page: usize,
    pub per_page: usize,
}

/// Slices `items` to the requested 1-based page.
///
/// Pages past the end are empty but still report the full count.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> ListingPage<T> {
    let page = page.max(1);
    let per_page = per_page.max(1);
    let start = (page - 1).saturating_mul(per_page).min(items.len());
    let end = start.saturating_add(per_page).min(items.len());

    ListingPage {
        nodes: items[start..end].to_vec(),
        total_count: items.len(),
        page,
        per_page,
    }
}

/// Applies category, tag and search filters, then paginates.
///
/// Input order is preserved.
pub fn list_posts(posts: &[Post], query: &ListingQuery, default_per_page: usize) -> ListingPage<Post> {
    let needle = query.search.as_deref().map(str::to_lowercase);

    let filtered: Vec<Post> = posts
        .iter()
        .filter(|post| {
            query
                .category
                .as_deref()
                .is_none_or(|category| post.in_category(category))
        })
        .filter(|post| query.tag.as_deref().is_none_or(|tag| post.has_tag(tag)))
        .filter(|post| {
            needle
                .as_deref()
                .is_none_or(|needle| post.matches_search(needle))
        })
        .cloned()
        .collect();

    paginate(&filtered, query.page(), query.per_page(default_per_page))
}
