use anyhow::{Context, Result};
use threadpress::{AppState, Command, Config, DailyArticleClient, GithubClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("threadpress=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();
    config.validate().context("Invalid configuration")?;
    tracing::debug!(?config, "Configuration loaded");

    let http = threadpress::github::http_client().context("Failed to build HTTP client")?;
    let github = GithubClient::new(
        http.clone(),
        &config.graphql_url,
        config.token(),
        config.owner(),
        config.repo(),
    )
    .with_max_items(config.max_items);

    match config.command() {
        Command::Serve => serve(&config, github, http).await,
        Command::SyncLabels { dry_run } => sync_labels(&github, dry_run).await,
        Command::RepoId => {
            let id = github
                .repository_id()
                .await
                .with_context(|| format!("Failed to fetch id of {}", github.repository()))?;
            println!("{}", id);
            Ok(())
        }
    }
}

async fn serve(config: &Config, github: GithubClient, http: reqwest::Client) -> Result<()> {
    let repository = github.repository();
    let daily = DailyArticleClient::new(http, &config.daily_article_url);
    let app = threadpress::router(AppState::new(github, daily, config.per_page));

    let listener = tokio::net::TcpListener::bind(&config.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.addr))?;
    tracing::info!(addr = %config.addr, %repository, "Serving blog API");

    axum::serve(listener, app).await.context("Server failed")?;

    Ok(())
}

async fn sync_labels(github: &GithubClient, dry_run: bool) -> Result<()> {
    let report = threadpress::labels::sync_labels(github, dry_run)
        .await
        .context("Failed to sync labels")?;

    if report.missing.is_empty() {
        println!("All tags already have labels");
    } else if dry_run {
        println!("Missing labels ({}):", report.missing.len());
        for name in &report.missing {
            println!("  {}", name);
        }
    } else {
        println!("Created {} labels:", report.created.len());
        for label in &report.created {
            println!("  {} #{}", label.name, label.color);
        }
    }

    Ok(())
}
