//! Blog backend serving GitHub Discussions as posts and comments.

pub mod avatar;
pub mod comments;
mod config;
pub mod content;
pub mod daily;
mod error;
pub mod frontmatter;
pub mod github;
pub mod labels;
pub mod listing;
pub mod markdown;
pub mod post;
pub mod server;
mod util;

pub use comments::{CommentNode, CommentView, build_comment_tree};
pub use config::{Command, Config};
pub use content::{process_body_html, strip_frontmatter_html};
pub use daily::{DailyArticle, DailyArticleClient, DailyArticleError};
pub use error::ApiError;
pub use frontmatter::{Frontmatter, FrontmatterValue};
pub use github::{GithubClient, GithubError};
pub use listing::{ListingPage, ListingQuery, list_posts, paginate};
pub use markdown::MarkdownRenderer;
pub use post::Post;
pub use server::{AppState, router};
pub use util::display_date;
