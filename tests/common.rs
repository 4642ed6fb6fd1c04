//! Shared test utilities for integration tests.
//!
//! Provides a fake GitHub GraphQL endpoint and daily article feed served by
//! axum on an ephemeral port, fixture builders for discussions and comments,
//! and a helper driving the real router with `oneshot`.

#![allow(dead_code)]

use anyhow::Result;
use axum::body::{Body, to_bytes};
use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use threadpress::{AppState, DailyArticleClient, GithubClient};
use tower::ServiceExt;

/// Canned content served by the fake endpoint.
#[derive(Debug, Clone, Default)]
pub struct FakeGithub {
    pub discussions: Vec<Value>,
    pub categories: Vec<Value>,
    pub labels: Vec<Value>,
    /// Top-level comments per discussion id.
    pub comments: HashMap<String, Vec<Value>>,
    /// Replies per parent comment id.
    pub replies: HashMap<String, Vec<Value>>,
    /// Forces every GraphQL call to answer with this HTTP status.
    pub status: Option<u16>,
    /// Answers every GraphQL call with a single error of this `type`.
    pub graphql_error: Option<(String, String)>,
    pub daily: Value,
    pub daily_status: Option<u16>,
}

/// GraphQL call seen by the fake endpoint.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub operation: String,
    pub variables: Value,
    pub accept: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Clone)]
struct Shared {
    fake: Arc<FakeGithub>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

/// Running fake server.
pub struct FakeServer {
    pub base_url: String,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl FakeServer {
    pub fn graphql_url(&self) -> String {
        format!("{}/graphql", self.base_url)
    }

    pub fn daily_url(&self) -> String {
        format!("{}/daily", self.base_url)
    }

    /// Calls recorded so far, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn calls_to(&self, operation: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.operation == operation)
            .collect()
    }

    /// Router of the API under test, wired to this fake.
    pub fn app(&self, max_items: usize) -> Result<Router> {
        let http = threadpress::github::http_client()?;
        let github = GithubClient::new(
            http.clone(),
            self.graphql_url(),
            "test-token",
            "octo",
            "blog",
        )
        .with_max_items(max_items);
        let daily = DailyArticleClient::new(http, self.daily_url());
        Ok(threadpress::router(AppState::new(github, daily, 10)))
    }

    /// GitHub client wired to this fake.
    pub fn client(&self, max_items: usize) -> Result<GithubClient> {
        let http = threadpress::github::http_client()?;
        Ok(
            GithubClient::new(http, self.graphql_url(), "test-token", "octo", "blog")
                .with_max_items(max_items),
        )
    }
}

/// Serves `fake` on an ephemeral local port.
///
/// # Errors
///
/// Returns error if the listener cannot be bound
pub async fn spawn_fake(fake: FakeGithub) -> Result<FakeServer> {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let shared = Shared {
        fake: Arc::new(fake),
        calls: Arc::clone(&calls),
    };

    let router = Router::new()
        .route("/graphql", post(graphql))
        .route("/daily", get(daily))
        .with_state(shared);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    Ok(FakeServer {
        base_url: format!("http://{}", addr),
        calls,
    })
}

async fn graphql(State(shared): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let query = body["query"].as_str().unwrap_or_default();
    let operation = threadpress::github::operation_name(query).to_string();
    let variables = body["variables"].clone();
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(String::from)
    };

    if let Ok(mut calls) = shared.calls.lock() {
        calls.push(RecordedCall {
            operation: operation.clone(),
            variables: variables.clone(),
            accept: header_value(header::ACCEPT),
            authorization: header_value(header::AUTHORIZATION),
        });
    }

    let fake = &shared.fake;
    if let Some(status) = fake.status {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, Json(json!({ "message": "Bad credentials" }))).into_response();
    }
    if let Some((kind, message)) = &fake.graphql_error {
        return Json(json!({
            "data": { "repository": null },
            "errors": [{ "type": kind, "message": message }]
        }))
        .into_response();
    }

    let data = match operation.as_str() {
        "GetDiscussions" => {
            let category = variables["categoryId"].as_str();
            let nodes: Vec<Value> = fake
                .discussions
                .iter()
                .filter(|node| category.is_none_or(|id| node["category"]["id"] == id))
                .cloned()
                .collect();
            json!({ "repository": { "discussions": page(&nodes, &variables) } })
        }
        "GetCategories" => {
            json!({ "repository": { "discussionCategories": { "nodes": fake.categories } } })
        }
        "GetLabels" => json!({ "repository": { "labels": page(&fake.labels, &variables) } }),
        "GetRepositoryId" => json!({ "repository": { "id": "R_kgDOtest" } }),
        "GetComments" => {
            let id = variables["discussionId"].as_str().unwrap_or_default();
            match fake.comments.get(id) {
                Some(nodes) => json!({ "node": { "comments": page(nodes, &variables) } }),
                None => json!({ "node": null }),
            }
        }
        "GetReplies" => {
            let id = variables["commentId"].as_str().unwrap_or_default();
            let nodes = fake.replies.get(id).cloned().unwrap_or_default();
            json!({ "node": { "replies": page(&nodes, &variables) } })
        }
        "AddComment" => {
            let reply_to = variables["replyToId"]
                .as_str()
                .map(|id| json!({ "id": id }));
            json!({
                "addDiscussionComment": {
                    "comment": {
                        "id": "DC_new",
                        "body": variables["body"],
                        "bodyHTML": "",
                        "createdAt": "2026-10-19T08:00:00Z",
                        "author": { "login": "blog-bot", "avatarUrl": "https://avatars/bot" },
                        "replyTo": reply_to
                    }
                }
            })
        }
        "CreateLabel" => json!({
            "createLabel": {
                "label": {
                    "id": format!("L_{}", variables["name"].as_str().unwrap_or_default()),
                    "name": variables["name"],
                    "color": variables["color"]
                }
            }
        }),
        _ => {
            return Json(json!({ "errors": [{ "message": "unknown operation" }] })).into_response();
        }
    };

    Json(json!({ "data": data })).into_response()
}

/// Slices `nodes` like a GraphQL connection; cursors are start offsets.
fn page(nodes: &[Value], variables: &Value) -> Value {
    let first = variables["first"].as_u64().unwrap_or(100) as usize;
    let start = variables["after"]
        .as_str()
        .and_then(|cursor| cursor.parse::<usize>().ok())
        .unwrap_or(0)
        .min(nodes.len());
    let end = (start + first).min(nodes.len());
    let has_next_page = end < nodes.len();

    json!({
        "nodes": nodes[start..end].to_vec(),
        "pageInfo": {
            "hasNextPage": has_next_page,
            "endCursor": has_next_page.then(|| end.to_string())
        },
        "totalCount": nodes.len()
    })
}

async fn daily(State(shared): State<Shared>) -> Response {
    match shared.fake.daily_status {
        Some(status) => StatusCode::from_u16(status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response(),
        None => Json(shared.fake.daily.clone()).into_response(),
    }
}

/// Builds a discussion node as GitHub returns it.
pub fn discussion(id: &str, title: &str, body: &str, labels: &[&str], category: &str) -> Value {
    let labels: Vec<Value> = labels
        .iter()
        .map(|name| json!({ "id": format!("L_{}", name), "name": name, "color": "ededed" }))
        .collect();
    json!({
        "id": id,
        "title": title,
        "body": body,
        "bodyHTML": "",
        "createdAt": "2024-03-05T10:00:00Z",
        "updatedAt": "2024-03-06T10:00:00Z",
        "author": { "login": "octocat", "avatarUrl": "https://avatars/octocat" },
        "category": { "id": category, "name": category, "description": null },
        "labels": { "nodes": labels },
        "comments": { "totalCount": 0 }
    })
}

/// Builds a top-level comment node.
pub fn comment(id: &str, body: &str, replies: usize) -> Value {
    json!({
        "id": id,
        "body": body,
        "bodyHTML": "",
        "createdAt": "2024-03-07T10:00:00Z",
        "author": { "login": "blog-bot", "avatarUrl": "https://avatars/bot" },
        "replies": { "totalCount": replies }
    })
}

/// Builds a reply node; `reply_to` may be omitted like GitHub sometimes does.
pub fn reply(id: &str, body: &str, reply_to: Option<&str>) -> Value {
    json!({
        "id": id,
        "body": body,
        "bodyHTML": "",
        "createdAt": "2024-03-08T10:00:00Z",
        "author": { "login": "blog-bot", "avatarUrl": "https://avatars/bot" },
        "replyTo": reply_to.map(|id| json!({ "id": id }))
    })
}

/// Sends `request` through `app` and decodes the JSON response.
///
/// # Errors
///
/// Returns error if the body cannot be read or is not JSON
pub async fn send(app: Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = app.oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, value))
}

pub async fn get_json(app: Router, uri: &str) -> Result<(StatusCode, Value)> {
    let request = Request::get(uri).body(Body::empty())?;
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))?;
    send(app, request).await
}
