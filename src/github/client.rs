//! GraphQL client for one GitHub repository.

use futures::stream::{self, StreamExt, TryStreamExt};
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::time::Duration;

use super::error::GithubError;
use super::queries;
use super::types::{
    AddCommentData, CategoriesField, Category, CommentsField, Connection, CreateLabelData,
    Discussion, DiscussionComment, DiscussionsField, GraphqlResponse, IdField, Label,
    LabelsField, NodeData, RepliesField, ReplyRef, RepositoryData,
};

/// Largest page GitHub serves for a connection.
pub const PAGE_SIZE: usize = 100;

/// Default cap on items collected by one paginated fetch.
pub const DEFAULT_MAX_ITEMS: usize = 1000;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Reply threads fetched at the same time.
const REPLY_CONCURRENCY: usize = 8;

/// Builds the shared HTTP client used for every outbound call.
///
/// # Errors
///
/// Returns error if the TLS backend cannot be initialized
pub fn http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(concat!("threadpress/", env!("CARGO_PKG_VERSION")))
        .timeout(REQUEST_TIMEOUT)
        .build()
}

/// Client for the discussions, labels and comments of one repository.
///
/// Cheap to share behind an `Arc`; the inner `reqwest::Client` pools
/// connections.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
    owner: String,
    name: String,
    max_items: usize,
}

impl GithubClient {
    /// Creates client for `owner/name` talking to `endpoint`.
    pub fn new(
        http: reqwest::Client,
        endpoint: impl Into<String>,
        token: impl Into<String>,
        owner: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            token: token.into(),
            owner: owner.into(),
            name: name.into(),
            max_items: DEFAULT_MAX_ITEMS,
        }
    }

    /// Sets the cap on items collected by a single paginated fetch.
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    /// Returns `owner/name`.
    pub fn repository(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    /// Fetches one page of discussions, newest first.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the repository does not exist
    pub async fn discussions_page(
        &self,
        first: usize,
        after: Option<String>,
        category_id: Option<&str>,
    ) -> Result<Connection<Discussion>, GithubError> {
        let field: DiscussionsField = self
            .repository_query(
                queries::DISCUSSIONS,
                json!({
                    "owner": self.owner,
                    "name": self.name,
                    "first": first,
                    "after": after,
                    "categoryId": category_id,
                }),
            )
            .await?;
        Ok(field.discussions)
    }

    /// Fetches every discussion up to the item cap, optionally limited to
    /// one category.
    ///
    /// # Errors
    ///
    /// Returns error if any page request fails
    pub async fn all_discussions(
        &self,
        category_id: Option<&str>,
    ) -> Result<Vec<Discussion>, GithubError> {
        self.collect_pages("discussions", self.max_items, |first, after| {
            self.discussions_page(first, after, category_id)
        })
        .await
    }

    /// Fetches discussion categories.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the repository does not exist
    pub async fn categories(&self) -> Result<Vec<Category>, GithubError> {
        let field: CategoriesField = self
            .repository_query(
                queries::CATEGORIES,
                json!({ "owner": self.owner, "name": self.name }),
            )
            .await?;
        Ok(field.discussion_categories.nodes)
    }

    /// Fetches every repository label up to the item cap.
    ///
    /// # Errors
    ///
    /// Returns error if any page request fails
    pub async fn labels(&self) -> Result<Vec<Label>, GithubError> {
        self.collect_pages("labels", self.max_items, |first, after| async move {
            let field: LabelsField = self
                .repository_query(
                    queries::LABELS,
                    json!({
                        "owner": self.owner,
                        "name": self.name,
                        "first": first,
                        "after": after,
                    }),
                )
                .await?;
            Ok(field.labels)
        })
        .await
    }

    /// Fetches the repository node id, needed to create labels.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the repository does not exist
    pub async fn repository_id(&self) -> Result<String, GithubError> {
        let field: IdField = self
            .repository_query(
                queries::REPOSITORY_ID,
                json!({ "owner": self.owner, "name": self.name }),
            )
            .await?;
        Ok(field.id)
    }

    /// Fetches the comments of a discussion together with their replies.
    ///
    /// Top-level comments are paged first. Replies are then fetched for the
    /// comments that have any, a few threads at a time, within what the
    /// top-level comments left of the item cap. The result is flat: each
    /// comment is followed by its replies, and every reply carries the id of
    /// its parent in `reply_to`.
    ///
    /// # Errors
    ///
    /// Returns error if any request fails or the discussion does not exist
    pub async fn comments(
        &self,
        discussion_id: &str,
    ) -> Result<Vec<DiscussionComment>, GithubError> {
        let top_level = self
            .collect_pages("comments", self.max_items, |first, after| async move {
                let field: CommentsField = self
                    .node_query(
                        queries::COMMENTS,
                        json!({ "discussionId": discussion_id, "first": first, "after": after }),
                        discussion_id,
                    )
                    .await?;
                Ok(field.comments)
            })
            .await?;

        // Replies share what is left of the cap, earliest threads first.
        let mut budget = self.max_items.saturating_sub(top_level.len());
        let mut plan = Vec::new();
        for comment in top_level.iter().filter(|comment| comment.reply_count() > 0) {
            if budget == 0 {
                tracing::warn!(
                    discussion = discussion_id,
                    cap = self.max_items,
                    "Comment cap reached, remaining replies skipped"
                );
                break;
            }
            let limit = comment.reply_count().min(budget);
            budget -= limit;
            plan.push((comment.id.clone(), limit));
        }

        tracing::debug!(
            discussion = discussion_id,
            comments = top_level.len(),
            threads = plan.len(),
            "Fetching replies"
        );

        let batches: Vec<(String, Vec<DiscussionComment>)> = stream::iter(plan)
            .map(|(id, limit)| async move {
                let thread = self.replies_up_to(&id, limit).await?;
                Ok::<_, GithubError>((id, thread))
            })
            .buffered(REPLY_CONCURRENCY)
            .try_collect()
            .await?;
        let mut replies: HashMap<String, Vec<DiscussionComment>> = batches.into_iter().collect();

        let mut flat = Vec::with_capacity(self.max_items.min(top_level.len() * 2));
        for comment in top_level {
            let thread = replies.remove(&comment.id).unwrap_or_default();
            let parent_id = comment.id.clone();
            flat.push(comment);
            for mut reply in thread {
                reply.reply_to.get_or_insert_with(|| ReplyRef {
                    id: parent_id.clone(),
                });
                flat.push(reply);
            }
        }

        Ok(flat)
    }

    /// Fetches every reply to one comment up to the item cap.
    ///
    /// # Errors
    ///
    /// Returns error if any request fails or the comment does not exist
    pub async fn replies(&self, comment_id: &str) -> Result<Vec<DiscussionComment>, GithubError> {
        self.replies_up_to(comment_id, self.max_items).await
    }

    async fn replies_up_to(
        &self,
        comment_id: &str,
        limit: usize,
    ) -> Result<Vec<DiscussionComment>, GithubError> {
        self.collect_pages("replies", limit, |first, after| async move {
            let field: RepliesField = self
                .node_query(
                    queries::REPLIES,
                    json!({ "commentId": comment_id, "first": first, "after": after }),
                    comment_id,
                )
                .await?;
            Ok(field.replies)
        })
        .await
    }

    /// Adds a comment to a discussion, optionally as a reply.
    ///
    /// # Errors
    ///
    /// Returns error if the mutation fails or returns no comment
    pub async fn add_comment(
        &self,
        discussion_id: &str,
        body: &str,
        reply_to: Option<&str>,
    ) -> Result<DiscussionComment, GithubError> {
        let data: AddCommentData = self
            .execute(
                queries::ADD_COMMENT,
                json!({ "discussionId": discussion_id, "body": body, "replyToId": reply_to }),
                None,
            )
            .await?;

        let comment = data
            .add_discussion_comment
            .ok_or(GithubError::MissingData)?
            .comment;
        tracing::info!(discussion = discussion_id, comment = %comment.id, "Comment added");
        Ok(comment)
    }

    /// Creates a repository label.
    ///
    /// # Errors
    ///
    /// Returns error if the mutation fails or returns no label
    pub async fn create_label(
        &self,
        repository_id: &str,
        name: &str,
        color: &str,
    ) -> Result<Label, GithubError> {
        let data: CreateLabelData = self
            .execute(
                queries::CREATE_LABEL,
                json!({ "repositoryId": repository_id, "name": name, "color": color }),
                Some(queries::LABEL_PREVIEW_ACCEPT),
            )
            .await?;

        Ok(data.create_label.ok_or(GithubError::MissingData)?.label)
    }

    /// Follows cursors until the last page or the item cap.
    ///
    /// `fetch_page` receives the page size to request and the cursor of the
    /// previous page. The page size shrinks near `limit` so no more than
    /// `limit` items are ever requested.
    async fn collect_pages<T, F, Fut>(
        &self,
        what: &str,
        limit: usize,
        mut fetch_page: F,
    ) -> Result<Vec<T>, GithubError>
    where
        F: FnMut(usize, Option<String>) -> Fut,
        Fut: Future<Output = Result<Connection<T>, GithubError>>,
    {
        let mut items = Vec::new();
        let mut cursor = None;

        while items.len() < limit {
            let first = PAGE_SIZE.min(limit - items.len());
            let page = fetch_page(first, cursor.take()).await?;
            items.extend(page.nodes);

            if !page.page_info.has_next_page {
                return Ok(items);
            }
            match page.page_info.end_cursor {
                Some(next) => cursor = Some(next),
                None => return Ok(items),
            }
        }

        tracing::warn!(
            what,
            cap = limit,
            repository = %self.repository(),
            "Item cap reached, remaining pages skipped"
        );
        items.truncate(limit);
        Ok(items)
    }

    /// Runs a query whose data is rooted at `repository`.
    async fn repository_query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<T, GithubError> {
        let data: RepositoryData<T> = self.execute(query, variables, None).await?;
        data.repository.ok_or_else(|| {
            GithubError::NotFound(format!("Repository not found: {}", self.repository()))
        })
    }

    /// Runs a query whose data is rooted at `node(id:)`.
    async fn node_query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
        id: &str,
    ) -> Result<T, GithubError> {
        let data: NodeData<T> = self.execute(query, variables, None).await?;
        data.node
            .ok_or_else(|| GithubError::NotFound(format!("Node not found: {}", id)))
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
        accept: Option<&str>,
    ) -> Result<T, GithubError> {
        let operation = operation_name(query);
        tracing::debug!(operation, endpoint = %self.endpoint, "GitHub GraphQL request");

        let mut request = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&json!({ "query": query, "variables": variables }));
        if let Some(accept) = accept {
            request = request.header(ACCEPT, accept);
        }

        let response = request.send().await?;
        match response.status() {
            StatusCode::UNAUTHORIZED => return Err(GithubError::Unauthorized),
            StatusCode::FORBIDDEN => return Err(GithubError::Forbidden),
            StatusCode::NOT_FOUND => {
                return Err(GithubError::NotFound(format!(
                    "Repository not found: {}",
                    self.repository()
                )));
            }
            status if !status.is_success() => return Err(GithubError::Status(status.as_u16())),
            _ => {}
        }

        let body: GraphqlResponse<T> = response.json().await?;
        if let Some(error) = body.errors.into_iter().next() {
            return Err(GithubError::from_graphql(error.kind.as_deref(), error.message));
        }
        body.data.ok_or(GithubError::MissingData)
    }
}

/// Extracts the operation name of a GraphQL document.
pub fn operation_name(query: &str) -> &str {
    query
        .split_whitespace()
        .skip_while(|word| *word != "query" && *word != "mutation")
        .nth(1)
        .and_then(|word| word.split('(').next())
        .unwrap_or("anonymous")
}
