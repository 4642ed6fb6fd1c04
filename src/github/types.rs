//! Response shapes of the GitHub GraphQL API.
//!
//! Field names follow the API (camelCase) so the same types serialize back
//! out of the blog endpoints unchanged.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub login: String,
    pub avatar_url: String,
}

/// Discussion category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Repository label. `color` is six hex digits without `#`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

/// One page of a GraphQL connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,
    #[serde(default)]
    pub page_info: PageInfo,
    #[serde(default)]
    pub total_count: usize,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            page_info: PageInfo::default(),
            total_count: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalCount {
    pub total_count: usize,
}

/// Discussion as returned by the API, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discussion {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(rename = "bodyHTML", default)]
    pub body_html: String,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    pub author: Option<Author>,
    pub category: Option<Category>,
    #[serde(default)]
    pub labels: Connection<Label>,
    #[serde(default)]
    pub comments: TotalCount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyRef {
    pub id: String,
}

/// Discussion comment or reply as returned by the API.
///
/// `reply_to` is set for replies only; `replies` is requested for top-level
/// comments only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionComment {
    pub id: String,
    #[serde(default)]
    pub body: String,
    #[serde(rename = "bodyHTML", default)]
    pub body_html: String,
    pub created_at: String,
    pub author: Option<Author>,
    #[serde(default)]
    pub reply_to: Option<ReplyRef>,
    #[serde(default)]
    pub replies: Option<TotalCount>,
}

impl DiscussionComment {
    /// Number of replies GitHub reports for this comment.
    pub fn reply_count(&self) -> usize {
        self.replies.map_or(0, |replies| replies.total_count)
    }
}

/// Envelope of every GraphQL response.
#[derive(Debug, Deserialize)]
pub(crate) struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GraphqlError {
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RepositoryData<T> {
    pub repository: Option<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NodeData<T> {
    pub node: Option<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DiscussionsField {
    pub discussions: Connection<Discussion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CategoriesField {
    pub discussion_categories: Connection<Category>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LabelsField {
    pub labels: Connection<Label>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IdField {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentsField {
    pub comments: Connection<DiscussionComment>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RepliesField {
    pub replies: Connection<DiscussionComment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddCommentData {
    pub add_discussion_comment: Option<CommentPayload>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentPayload {
    pub comment: DiscussionComment,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateLabelData {
    pub create_label: Option<LabelPayload>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LabelPayload {
    pub label: Label,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_discussion_deserializes_api_shape() {
        // Arrange
        let value = json!({
            "id": "D_1",
            "title": "Hello",
            "body": "---\nslug: hello\n---\nBody",
            "bodyHTML": "<p>Body</p>",
            "createdAt": "2024-01-02T03:04:05Z",
            "updatedAt": "2024-01-03T03:04:05Z",
            "author": { "login": "octocat", "avatarUrl": "https://a/x.png" },
            "category": { "id": "C_1", "name": "Blog", "description": null },
            "labels": { "nodes": [{ "id": "L_1", "name": "rust", "color": "dea584" }] },
            "comments": { "totalCount": 3 }
        });

        // Act
        let discussion: Discussion = serde_json::from_value(value).expect("Should deserialize");

        // Assert
        assert_eq!(discussion.body_html, "<p>Body</p>");
        assert_eq!(discussion.labels.nodes[0].name, "rust");
        assert_eq!(discussion.comments.total_count, 3);
        assert_eq!(
            discussion.author.map(|author| author.login),
            Some("octocat".to_string())
        );
    }

    #[test]
    fn test_discussion_tolerates_missing_optional_fields() {
        // Arrange
        let value = json!({
            "id": "D_2",
            "title": "Bare",
            "createdAt": "2024-01-02T03:04:05Z",
            "author": null,
            "category": null
        });

        // Act
        let discussion: Discussion = serde_json::from_value(value).expect("Should deserialize");

        // Assert
        assert!(discussion.labels.nodes.is_empty());
        assert_eq!(discussion.comments.total_count, 0);
        assert_eq!(discussion.body, "");
    }

    #[test]
    fn test_graphql_error_type_field() {
        // Arrange
        let value = json!({
            "data": { "repository": null },
            "errors": [{ "type": "NOT_FOUND", "message": "Could not resolve" }]
        });

        // Act
        let response: GraphqlResponse<RepositoryData<LabelsField>> =
            serde_json::from_value(value).expect("Should deserialize");

        // Assert
        assert_eq!(response.errors[0].kind.as_deref(), Some("NOT_FOUND"));
        assert!(response.data.expect("Should have data").repository.is_none());
    }

    #[test]
    fn test_comment_reply_count() {
        let value = json!({
            "id": "DC_1",
            "createdAt": "2024-01-02T03:04:05Z",
            "author": null,
            "replies": { "totalCount": 2 }
        });
        let comment: DiscussionComment = serde_json::from_value(value).expect("Should deserialize");
        assert_eq!(comment.reply_count(), 2);
        assert!(comment.reply_to.is_none());
    }
}
