// SPDX-License-Identifier: Apache-2.0

//! Pull request fetching and description publishing via Octocrab.

use anyhow::{Context, Result};
use octocrab::Octocrab;
use octocrab::models::repos::DiffEntry;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::GitHubConfig;
use crate::error::AutodescError;

/// A file touched by the pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    /// Path of the file in the repository.
    pub filename: String,
    /// Unified diff; absent for binary or very large changes.
    pub patch: Option<String>,
}

impl ChangedFile {
    /// Creates a changed file entry.
    pub fn new(filename: impl Into<String>, patch: Option<impl Into<String>>) -> Self {
        Self {
            filename: filename.into(),
            patch: patch.map(Into::into),
        }
    }
}

impl From<DiffEntry> for ChangedFile {
    fn from(entry: DiffEntry) -> Self {
        Self {
            filename: entry.filename,
            patch: entry.patch,
        }
    }
}

/// Everything the pipeline needs to know about a pull request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, bon::Builder)]
pub struct ChangeSet {
    /// Pull request title.
    #[builder(into)]
    pub title: String,
    /// Current description, if any.
    #[builder(into)]
    pub body: Option<String>,
    /// Login of the pull request author.
    #[builder(into)]
    pub author: Option<String>,
    /// Changed files, in API order.
    #[builder(default)]
    pub files: Vec<ChangedFile>,
}

impl ChangeSet {
    /// Whether the pull request already carries a non-blank description.
    #[must_use]
    pub fn has_description(&self) -> bool {
        self.body.as_deref().is_some_and(|b| !b.trim().is_empty())
    }
}

/// Fetches the title, description, author and changed files of a pull request.
///
/// Files are requested `config.per_page` at a time, for at most
/// `config.max_pages` pages; an empty page ends the listing early.
///
/// # Errors
///
/// Returns an error if any API call fails or the pull request is not found.
#[instrument(skip(client, config), fields(owner = %owner, repo = %repo, number = number))]
pub async fn fetch_change_set(
    client: &Octocrab,
    config: &GitHubConfig,
    owner: &str,
    repo: &str,
    number: u64,
) -> Result<ChangeSet> {
    debug!("Fetching pull request");

    let pr = client
        .pulls(owner, repo)
        .get(number)
        .await
        .map_err(AutodescError::from)
        .with_context(|| format!("Failed to fetch PR #{number} from {owner}/{repo}"))?;

    let route = format!("/repos/{owner}/{repo}/pulls/{number}/files");
    let mut files: Vec<ChangedFile> = Vec::new();
    for page in 1..=config.max_pages {
        let params = [
            ("page", page.to_string()),
            ("per_page", config.per_page.to_string()),
        ];
        let chunk: Vec<DiffEntry> = client
            .get(&route, Some(&params))
            .await
            .map_err(AutodescError::from)
            .with_context(|| format!("Failed to fetch files for PR #{number} (page {page})"))?;

        if chunk.is_empty() {
            break;
        }
        debug!(page, count = chunk.len(), "Fetched page of changed files");
        files.extend(chunk.into_iter().map(ChangedFile::from));
    }

    let change_set = ChangeSet::builder()
        .title(pr.title.unwrap_or_default())
        .maybe_body(pr.body)
        .maybe_author(pr.user.map(|u| u.login))
        .files(files)
        .build();

    debug!(
        file_count = change_set.files.len(),
        "Pull request fetched successfully"
    );

    Ok(change_set)
}

/// Replaces the description of a pull request.
///
/// # Errors
///
/// Returns an error if the API request fails.
#[instrument(skip(client, description), fields(owner = %owner, repo = %repo, number = number))]
pub async fn publish_description(
    client: &Octocrab,
    owner: &str,
    repo: &str,
    number: u64,
    description: &str,
) -> Result<()> {
    debug!("Publishing pull request description");

    client
        .issues(owner, repo)
        .update(number)
        .body(description)
        .send()
        .await
        .map_err(AutodescError::from)
        .with_context(|| format!("Failed to update description of PR #{number}"))?;

    debug!("Description published successfully");
    Ok(())
}
