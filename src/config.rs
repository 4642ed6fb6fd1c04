//! Command line configuration.

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::fmt;

use crate::github::DEFAULT_MAX_ITEMS;

/// Command line configuration for threadpress.
///
/// Every option can also be set through the environment; a `.env` file in
/// the working directory is loaded before parsing.
#[derive(Clone, Parser)]
#[command(name = "threadpress", version, about, long_about = None)]
pub struct Config {
    /// GitHub token used as bearer credential
    #[arg(long, env = "GITHUB_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Owner of the repository holding the discussions
    #[arg(long, env = "GITHUB_REPO_OWNER", global = true)]
    pub owner: Option<String>,

    /// Name of the repository holding the discussions
    #[arg(long, env = "GITHUB_REPO_NAME", global = true)]
    pub repo: Option<String>,

    /// Address the API listens on
    #[arg(long, env = "BLOG_ADDR", default_value = "0.0.0.0:3000")]
    pub addr: String,

    /// GitHub GraphQL endpoint
    #[arg(
        long,
        env = "GITHUB_GRAPHQL_URL",
        global = true,
        default_value = "https://api.github.com/graphql"
    )]
    pub graphql_url: String,

    /// Endpoint of the daily article feed
    #[arg(
        long,
        env = "DAILY_ARTICLE_URL",
        default_value = "https://www.qhsou.com/one/api.php"
    )]
    pub daily_article_url: String,

    /// Posts per page when the request does not say
    #[arg(long, env = "BLOG_PER_PAGE", default_value_t = 10)]
    pub per_page: usize,

    /// Cap on items collected by one paginated fetch
    #[arg(long, env = "BLOG_MAX_ITEMS", global = true, default_value_t = DEFAULT_MAX_ITEMS)]
    pub max_items: usize,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Serve the blog API (default)
    Serve,
    /// Create a label for every frontmatter tag that has none
    SyncLabels {
        /// List missing labels without creating them
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the repository node id
    RepoId,
}

impl Config {
    /// Parses configuration from command line arguments.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Validates configuration.
    ///
    /// # Errors
    ///
    /// Returns error listing every missing GitHub setting, or if a numeric
    /// option is zero.
    pub fn validate(&self) -> Result<()> {
        let required = [
            (&self.token, "GITHUB_TOKEN"),
            (&self.owner, "GITHUB_REPO_OWNER"),
            (&self.repo, "GITHUB_REPO_NAME"),
        ];
        let missing: Vec<String> = required
            .iter()
            .filter(|(value, _)| value.as_deref().is_none_or(|value| value.trim().is_empty()))
            .map(|(_, name)| format!("{} is not set", name))
            .collect();

        if !missing.is_empty() {
            bail!("GitHub API configuration error: {}", missing.join(", "));
        }
        if self.per_page == 0 {
            bail!("BLOG_PER_PAGE must be at least 1");
        }
        if self.max_items == 0 {
            bail!("BLOG_MAX_ITEMS must be at least 1");
        }

        Ok(())
    }

    /// Returns the subcommand, `serve` when none was given.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }

    pub fn token(&self) -> &str {
        self.token.as_deref().unwrap_or_default()
    }

    pub fn owner(&self) -> &str {
        self.owner.as_deref().unwrap_or_default()
    }

    pub fn repo(&self) -> &str {
        self.repo.as_deref().unwrap_or_default()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("addr", &self.addr)
            .field("graphql_url", &self.graphql_url)
            .field("daily_article_url", &self.daily_article_url)
            .field("per_page", &self.per_page)
            .field("max_items", &self.max_items)
            .field("command", &self.command)
            .finish()
    }
}
