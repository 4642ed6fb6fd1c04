//! Proxy for the third-party daily article feed.

use reqwest::header::{ACCEPT, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const BOT_USER_AGENT: &str = "Mozilla/5.0 (compatible; BlogBot/1.0)";

/// Article of the day. Fields beyond the required three are passed through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyArticle {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub content: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DailyArticle {
    fn is_complete(&self) -> bool {
        [&self.title, &self.author, &self.content]
            .iter()
            .all(|field| !field.trim().is_empty())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DailyArticleError {
    #[error("failed to reach daily article feed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP error! status: {0}")]
    Status(u16),
    #[error("Invalid API response format")]
    InvalidFormat,
}

/// Client for the daily article endpoint.
#[derive(Debug, Clone)]
pub struct DailyArticleClient {
    http: reqwest::Client,
    url: String,
}

impl DailyArticleClient {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    /// Fetches and validates today's article.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails, the feed answers with a non-2xx
    /// status, or the payload lacks a non-empty `title`, `author` or
    /// `content`.
    pub async fn fetch(&self) -> Result<DailyArticle, DailyArticleError> {
        tracing::debug!(url = %self.url, "Fetching daily article");

        let response = self
            .http
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, BOT_USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DailyArticleError::Status(status.as_u16()));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|_| DailyArticleError::InvalidFormat)?;
        parse_article(payload)
    }
}

/// Validates a feed payload.
///
/// # Errors
///
/// Returns [`DailyArticleError::InvalidFormat`] if the payload is not an
/// object with non-empty string `title`, `author` and `content`.
pub fn parse_article(payload: Value) -> Result<DailyArticle, DailyArticleError> {
    let article: DailyArticle =
        serde_json::from_value(payload).map_err(|_| DailyArticleError::InvalidFormat)?;
    if article.is_complete() {
        Ok(article)
    } else {
        Err(DailyArticleError::InvalidFormat)
    }
}
