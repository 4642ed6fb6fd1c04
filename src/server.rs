//! HTTP API.
//!
//! Every handler fetches fresh data from GitHub; nothing is cached between
//! requests.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::comments::{CommentNode, CommentView, NewComment, build_comment_tree, compose_comment_body};
use crate::daily::{DailyArticle, DailyArticleClient};
use crate::error::ApiError;
use crate::github::{Category, GithubClient, Label};
use crate::listing::{ListingPage, ListingQuery, list_posts};
use crate::markdown::MarkdownRenderer;
use crate::post::Post;

/// Shared, read-only state of the API.
#[derive(Clone)]
pub struct AppState {
    pub github: Arc<GithubClient>,
    pub daily: Arc<DailyArticleClient>,
    /// Renders post bodies GitHub returned without HTML; passes raw HTML.
    pub post_renderer: Arc<MarkdownRenderer>,
    /// Renders visitor comments; drops raw HTML.
    pub comment_renderer: Arc<MarkdownRenderer>,
    pub per_page: usize,
}

impl AppState {
    pub fn new(github: GithubClient, daily: DailyArticleClient, per_page: usize) -> Self {
        Self {
            github: Arc::new(github),
            daily: Arc::new(daily),
            post_renderer: Arc::new(MarkdownRenderer::with_raw_html()),
            comment_renderer: Arc::new(MarkdownRenderer::new()),
            per_page,
        }
    }
}

/// Builds the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/posts", get(posts))
        .route("/api/post/:slug", get(post))
        .route("/api/comments/:discussion_id", get(comments).post(add_comment))
        .route("/api/daily-article", get(daily_article))
        .route("/api/categories", get(categories))
        .route("/api/labels", get(labels))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true, "version": env!("CARGO_PKG_VERSION") }))
}

async fn fetch_posts(state: &AppState, category: Option<&str>) -> Result<Vec<Post>, ApiError> {
    let discussions = state.github.all_discussions(category).await?;
    let posts = discussions
        .into_iter()
        .map(|discussion| Post::from_discussion(discussion, &state.post_renderer))
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(posts)
}

async fn posts(
    State(state): State<AppState>,
    query: Result<Query<ListingQuery>, QueryRejection>,
) -> Result<Json<ListingPage<Post>>, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let posts = fetch_posts(&state, query.category.as_deref()).await?;
    let page = list_posts(&posts, &query, state.per_page);
    tracing::debug!(
        fetched = posts.len(),
        matched = page.total_count,
        page = page.page,
        "Listing posts"
    );
    Ok(Json(page))
}

/// Looks a post up by slug, then by discussion id.
async fn post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Post>, ApiError> {
    let mut posts = fetch_posts(&state, None).await?;
    let position = posts
        .iter()
        .position(|post| post.slug == slug)
        .or_else(|| posts.iter().position(|post| post.is_addressed_by(&slug)))
        .ok_or(ApiError::NotFound)?;

    Ok(Json(posts.swap_remove(position)))
}

#[derive(Debug, Serialize)]
struct CommentsResponse {
    comments: Vec<CommentView>,
    threads: Vec<CommentNode>,
}

async fn comments(
    State(state): State<AppState>,
    Path(discussion_id): Path<String>,
) -> Result<Json<CommentsResponse>, ApiError> {
    let raw = state.github.comments(&discussion_id).await?;
    let comments = raw
        .into_iter()
        .map(|comment| CommentView::from_comment(comment, &state.comment_renderer))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let threads = build_comment_tree(comments.clone());

    Ok(Json(CommentsResponse { comments, threads }))
}

#[derive(Debug, Serialize)]
struct AddCommentResponse {
    comment: CommentView,
}

async fn add_comment(
    State(state): State<AppState>,
    Path(discussion_id): Path<String>,
    payload: Result<Json<NewComment>, JsonRejection>,
) -> Result<Json<AddCommentResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let (nickname, text) = request
        .required_fields()
        .ok_or_else(|| ApiError::BadRequest("Nickname and body are required".to_string()))?;

    let body = compose_comment_body(nickname, request.email.as_deref(), text, Utc::now());
    let created = state
        .github
        .add_comment(&discussion_id, &body, request.reply_to())
        .await?;
    let comment = CommentView::from_comment(created, &state.comment_renderer)?;

    Ok(Json(AddCommentResponse { comment }))
}

async fn daily_article(State(state): State<AppState>) -> Result<Json<DailyArticle>, ApiError> {
    Ok(Json(state.daily.fetch().await?))
}

async fn categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.github.categories().await?))
}

async fn labels(State(state): State<AppState>) -> Result<Json<Vec<Label>>, ApiError> {
    Ok(Json(state.github.labels().await?))
}
