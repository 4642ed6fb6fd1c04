//! GitHub Discussions as a content store.
//!
//! Thin GraphQL client: queries for discussions, categories, labels,
//! comments and replies, plus the `addDiscussionComment` and `createLabel`
//! mutations. Responses are returned raw; normalization happens in
//! [`crate::post`] and [`crate::comments`].

mod client;
mod error;
pub mod queries;
mod types;

pub use client::{DEFAULT_MAX_ITEMS, GithubClient, PAGE_SIZE, http_client, operation_name};
pub use error::GithubError;
pub use types::{
    Author, Category, Connection, Discussion, DiscussionComment, Label, PageInfo, ReplyRef,
    TotalCount,
};
