//! GraphQL documents sent to GitHub.
//!
//! Each document names its operation; the fake endpoint in the integration
//! tests dispatches on that name.

pub const DISCUSSIONS: &str = r#"
query GetDiscussions($owner: String!, $name: String!, $first: Int!, $after: String, $categoryId: ID) {
  repository(owner: $owner, name: $name) {
    discussions(first: $first, after: $after, categoryId: $categoryId, orderBy: { field: CREATED_AT, direction: DESC }) {
      nodes {
        id
        title
        body
        bodyHTML
        createdAt
        updatedAt
        author { login avatarUrl }
        category { id name description }
        labels(first: 10) { nodes { id name color } }
        comments { totalCount }
      }
      pageInfo { hasNextPage endCursor }
      totalCount
    }
  }
}
"#;

pub const CATEGORIES: &str = r#"
query GetCategories($owner: String!, $name: String!) {
  repository(owner: $owner, name: $name) {
    discussionCategories(first: 100) {
      nodes { id name description }
    }
  }
}
"#;

pub const LABELS: &str = r#"
query GetLabels($owner: String!, $name: String!, $first: Int!, $after: String) {
  repository(owner: $owner, name: $name) {
    labels(first: $first, after: $after) {
      nodes { id name color }
      pageInfo { hasNextPage endCursor }
      totalCount
    }
  }
}
"#;

pub const REPOSITORY_ID: &str = r#"
query GetRepositoryId($owner: String!, $name: String!) {
  repository(owner: $owner, name: $name) {
    id
  }
}
"#;

pub const COMMENTS: &str = r#"
query GetComments($discussionId: ID!, $first: Int!, $after: String) {
  node(id: $discussionId) {
    ... on Discussion {
      comments(first: $first, after: $after) {
        nodes {
          id
          body
          bodyHTML
          createdAt
          author { login avatarUrl }
          replies { totalCount }
        }
        pageInfo { hasNextPage endCursor }
        totalCount
      }
    }
  }
}
"#;

pub const REPLIES: &str = r#"
query GetReplies($commentId: ID!, $first: Int!, $after: String) {
  node(id: $commentId) {
    ... on DiscussionComment {
      replies(first: $first, after: $after) {
        nodes {
          id
          body
          bodyHTML
          createdAt
          author { login avatarUrl }
          replyTo { id }
        }
        pageInfo { hasNextPage endCursor }
        totalCount
      }
    }
  }
}
"#;

pub const ADD_COMMENT: &str = r#"
mutation AddComment($discussionId: ID!, $body: String!, $replyToId: ID) {
  addDiscussionComment(input: { discussionId: $discussionId, body: $body, replyToId: $replyToId }) {
    comment {
      id
      body
      bodyHTML
      createdAt
      author { login avatarUrl }
      replyTo { id }
    }
  }
}
"#;

/// Requires the `bane-preview` media type.
pub const CREATE_LABEL: &str = r#"
mutation CreateLabel($repositoryId: ID!, $name: String!, $color: String!) {
  createLabel(input: { repositoryId: $repositoryId, name: $name, color: $color }) {
    label { id name color }
  }
}
"#;

pub const LABEL_PREVIEW_ACCEPT: &str = "application/vnd.github.bane-preview+json";
