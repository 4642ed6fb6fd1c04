//! Visitor comments: normalization, threading and composition.
//!
//! GitHub nests replies one level deep. The API flattens a discussion into
//! top-level comments followed by their replies, each reply pointing at its
//! parent through `reply_to`. [`build_comment_tree`] turns that flat list
//! back into a forest.

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::avatar::avatar_url;
use crate::content::process_markdown;
use crate::frontmatter::{self, Frontmatter};
use crate::github::{Author, DiscussionComment};
use crate::markdown::MarkdownRenderer;

/// Login shown for comments without any author information.
pub const ANONYMOUS: &str = "Anonymous";

/// Comment normalized for display.
///
/// Comments posted through the blog are made by the token owner, so the
/// visible author comes from the embedded `nickname`/`email` header when
/// present. The header itself never reaches the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: String,
    pub body: String,
    #[serde(rename = "bodyHTML")]
    pub body_html: String,
    pub author: Author,
    pub created_at: String,
    pub reply_to: Option<String>,
}

impl CommentView {
    /// Normalizes a raw comment, rendering its Markdown with `renderer`.
    ///
    /// # Errors
    ///
    /// Returns error if rendering fails
    pub fn from_comment(comment: DiscussionComment, renderer: &MarkdownRenderer) -> Result<Self> {
        let (meta, content) = frontmatter::parse(&comment.body);
        let author = comment_author(&meta, comment.author);
        let body_html = process_markdown(renderer, &comment.body)?;
        let body = content.to_string();

        Ok(Self {
            id: comment.id,
            body,
            body_html,
            author,
            created_at: comment.created_at,
            reply_to: comment.reply_to.map(|parent| parent.id),
        })
    }
}

fn comment_author(meta: &Frontmatter, github: Option<Author>) -> Author {
    if let Some(nickname) = meta.nickname() {
        return Author {
            login: nickname.to_string(),
            avatar_url: avatar_url(nickname, meta.email()),
        };
    }

    github.unwrap_or_else(|| Author {
        login: ANONYMOUS.to_string(),
        avatar_url: avatar_url(ANONYMOUS, None),
    })
}

/// Comment with its replies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentNode {
    #[serde(flatten)]
    pub comment: CommentView,
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    /// Number of comments in this subtree, the node included.
    pub fn size(&self) -> usize {
        let mut size = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            size += 1;
            pending.extend(&node.replies);
        }
        size
    }

    /// Longest path from this node to a leaf; 0 for a leaf.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut pending = vec![(self, 0)];
        while let Some((node, level)) = pending.pop() {
            depth = depth.max(level);
            pending.extend(node.replies.iter().map(|reply| (reply, level + 1)));
        }
        depth
    }
}

// Reply chains can be arbitrarily long; unlink them without recursion.
impl Drop for CommentNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.replies);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.replies);
        }
    }
}

/// Rebuilds the reply forest of a flat comment list.
///
/// A comment becomes a child of the comment its `reply_to` names. It is a
/// root when `reply_to` is empty, names itself, or names an id missing from
/// the list. When ids repeat, replies attach to the first occurrence. A
/// reply cycle is cut by promoting its earliest member to a root. Every
/// input comment ends up in the forest exactly once; roots and siblings keep
/// input order.
pub fn build_comment_tree(comments: Vec<CommentView>) -> Vec<CommentNode> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(comments.len());
    for (position, comment) in comments.iter().enumerate() {
        index.entry(comment.id.as_str()).or_insert(position);
    }

    let mut parents: Vec<Option<usize>> = comments
        .iter()
        .enumerate()
        .map(|(position, comment)| {
            comment
                .reply_to
                .as_deref()
                .and_then(|parent| index.get(parent).copied())
                .filter(|parent| *parent != position)
        })
        .collect();

    break_cycles(&mut parents);

    let mut roots = Vec::new();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); comments.len()];
    for (position, parent) in parents.iter().enumerate() {
        match parent {
            Some(parent) => children[*parent].push(position),
            None => roots.push(position),
        }
    }

    // Parents precede their replies in `order`, so walking it backwards
    // builds every subtree before the node that owns it.
    let mut order = Vec::with_capacity(comments.len());
    let mut pending: Vec<usize> = roots.iter().rev().copied().collect();
    while let Some(position) = pending.pop() {
        order.push(position);
        pending.extend(children[position].iter().rev());
    }

    let mut slots: Vec<Option<CommentView>> = comments.into_iter().map(Some).collect();
    let mut built: Vec<Option<CommentNode>> = slots.iter().map(|_| None).collect();
    for &position in order.iter().rev() {
        let Some(comment) = slots[position].take() else {
            continue;
        };
        let replies = children[position]
            .iter()
            .filter_map(|child| built[*child].take())
            .collect();
        built[position] = Some(CommentNode { comment, replies });
    }

    roots
        .into_iter()
        .filter_map(|root| built[root].take())
        .collect()
}

/// Clears the parent link of the earliest member of every cycle.
fn break_cycles(parents: &mut [Option<usize>]) {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        OnPath,
        Done,
    }

    let mut marks = vec![Mark::Unvisited; parents.len()];
    for start in 0..parents.len() {
        let mut path = Vec::new();
        let mut current = Some(start);

        while let Some(node) = current {
            if marks[node] != Mark::Unvisited {
                break;
            }
            marks[node] = Mark::OnPath;
            path.push(node);
            current = parents[node];
        }

        let cycle_start = current
            .filter(|node| marks[*node] == Mark::OnPath)
            .and_then(|node| path.iter().position(|member| *member == node));
        if let Some(earliest) = cycle_start.and_then(|start| path[start..].iter().min().copied()) {
            parents[earliest] = None;
        }

        for node in path {
            marks[node] = Mark::Done;
        }
    }
}

/// Comment submitted by a visitor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub reply_to: Option<String>,
}

impl NewComment {
    /// Returns the trimmed nickname and body when both are non-empty.
    pub fn required_fields(&self) -> Option<(&str, &str)> {
        let nickname = self.nickname.as_deref().map(str::trim)?;
        let body = self.body.as_deref().map(str::trim)?;
        (!nickname.is_empty() && !body.is_empty()).then_some((nickname, body))
    }

    /// Parent comment id, with blank values read as none.
    pub fn reply_to(&self) -> Option<&str> {
        self.reply_to
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// Builds the stored body of a visitor comment.
///
/// The text is prefixed with a header holding `nickname`, `email` (only
/// when non-empty) and `timestamp`. Line breaks in header values are
/// replaced with spaces so they cannot end the header early.
pub fn compose_comment_body(
    nickname: &str,
    email: Option<&str>,
    body: &str,
    timestamp: DateTime<Utc>,
) -> String {
    let mut header = Frontmatter::new();
    header.insert("nickname", single_line(nickname));
    if let Some(email) = email.map(str::trim).filter(|email| !email.is_empty()) {
        header.insert("email", single_line(email));
    }
    header.insert(
        "timestamp",
        timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
    );

    format!("{}{}", header.to_header(), body)
}

fn single_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ").trim().to_string()
}
