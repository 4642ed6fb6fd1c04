//! Label sync against a fake GitHub endpoint.

mod common;

use anyhow::Result;
use common::{FakeGithub, discussion, spawn_fake};
use serde_json::json;
use threadpress::labels::sync_labels;

fn tagged_fixture() -> FakeGithub {
    FakeGithub {
        discussions: vec![
            discussion("D_1", "One", "---\ntags: rust, Async\n---\nx", &[], "C"),
            discussion("D_2", "Two", "---\ntags: async, graphql\n---\ny", &[], "C"),
            discussion("D_3", "Three", "No frontmatter", &[], "C"),
        ],
        labels: vec![json!({ "id": "L_rust", "name": "Rust", "color": "dea584" })],
        ..FakeGithub::default()
    }
}

#[tokio::test]
async fn test_dry_run_creates_nothing() -> Result<()> {
    // Arrange
    let fake = spawn_fake(tagged_fixture()).await?;
    let client = fake.client(1000)?;

    // Act
    let report = sync_labels(&client, true).await?;

    // Assert
    assert_eq!(report.missing, ["Async", "graphql"]);
    assert!(report.created.is_empty());
    assert!(fake.calls_to("CreateLabel").is_empty());
    assert!(fake.calls_to("GetRepositoryId").is_empty());
    Ok(())
}

#[tokio::test]
async fn test_sync_creates_missing_labels() -> Result<()> {
    // Arrange
    let fake = spawn_fake(tagged_fixture()).await?;
    let client = fake.client(1000)?;

    // Act
    let report = sync_labels(&client, false).await?;

    // Assert
    let names: Vec<&str> = report.created.iter().map(|label| label.name.as_str()).collect();
    assert_eq!(names, ["Async", "graphql"]);

    let calls = fake.calls_to("CreateLabel");
    assert_eq!(calls.len(), 2);
    for call in &calls {
        assert_eq!(call.variables["repositoryId"], "R_kgDOtest");
        assert_eq!(
            call.accept.as_deref(),
            Some("application/vnd.github.bane-preview+json")
        );
        let color = call.variables["color"].as_str().unwrap_or_default();
        assert_eq!(color.len(), 6, "Color without '#': {}", color);
    }
    Ok(())
}

#[tokio::test]
async fn test_repository_id() -> Result<()> {
    let fake = spawn_fake(FakeGithub::default()).await?;

    let id = fake.client(1000)?.repository_id().await?;

    assert_eq!(id, "R_kgDOtest");
    Ok(())
}
