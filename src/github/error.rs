/// Failure talking to the GitHub GraphQL API.
#[derive(Debug, thiserror::Error)]
pub enum GithubError {
    #[error("GitHub authentication failed. Please check your token.")]
    Unauthorized,
    #[error("Access denied. Please check your token permissions.")]
    Forbidden,
    #[error("{0}")]
    NotFound(String),
    #[error("GitHub GraphQL error: {0}")]
    Graphql(String),
    #[error("GitHub API returned status {0}")]
    Status(u16),
    #[error("failed to reach GitHub API: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("GitHub API response carried no data")]
    MissingData,
}

impl GithubError {
    /// Maps a GraphQL error `type` to a typed error.
    pub(crate) fn from_graphql(kind: Option<&str>, message: String) -> Self {
        match kind {
            Some("NOT_FOUND") => GithubError::NotFound(message),
            Some("FORBIDDEN") => GithubError::Forbidden,
            _ => GithubError::Graphql(message),
        }
    }
}
