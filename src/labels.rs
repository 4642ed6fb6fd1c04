//! Creates repository labels for frontmatter tags.
//!
//! Posts declare tags in their frontmatter; GitHub only knows labels. The
//! sync makes every declared tag available as a label so it shows up in the
//! GitHub UI as well.

use crate::avatar::label_color;
use crate::frontmatter;
use crate::github::{GithubClient, GithubError, Label};

/// Outcome of a label sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Tags without a label, in first-seen order.
    pub missing: Vec<String>,
    /// Labels created; empty on a dry run.
    pub created: Vec<Label>,
}

/// Returns tags that have no label yet.
///
/// GitHub label names are unique regardless of case, so the comparison
/// ignores case. Each missing tag is listed once, with the spelling of its
/// first occurrence.
pub fn missing_labels<'a, I>(tags: I, existing: &[Label]) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut known: Vec<String> = existing
        .iter()
        .map(|label| label.name.to_lowercase())
        .collect();
    let mut missing = Vec::new();

    for tag in tags {
        let key = tag.to_lowercase();
        if !known.contains(&key) {
            known.push(key);
            missing.push(tag.to_string());
        }
    }

    missing
}

/// Creates a label for every frontmatter tag that lacks one.
///
/// Labels are created one at a time, colored with [`label_color`].
///
/// # Errors
///
/// Returns error if fetching discussions or labels fails, or if creating a
/// label fails. Labels created before the failure are kept on GitHub.
pub async fn sync_labels(client: &GithubClient, dry_run: bool) -> Result<SyncReport, GithubError> {
    let discussions = client.all_discussions(None).await?;
    let existing = client.labels().await?;

    let records: Vec<_> = discussions
        .iter()
        .map(|discussion| frontmatter::parse(&discussion.body).0)
        .collect();
    let missing = missing_labels(
        records
            .iter()
            .flat_map(|record| record.tags().iter().map(String::as_str)),
        &existing,
    );

    tracing::info!(
        discussions = discussions.len(),
        labels = existing.len(),
        missing = missing.len(),
        "Label sync planned"
    );

    if dry_run || missing.is_empty() {
        return Ok(SyncReport {
            missing,
            created: Vec::new(),
        });
    }

    let repository_id = client.repository_id().await?;
    let mut created = Vec::with_capacity(missing.len());
    for name in &missing {
        let label = client
            .create_label(&repository_id, name, &label_color(name))
            .await?;
        tracing::info!(label = %label.name, color = %label.color, "Label created");
        created.push(label);
    }

    Ok(SyncReport { missing, created })
}
