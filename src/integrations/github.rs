//! GitHub REST adapter
//!
//! Read-only: lists the account's repositories, their open issues, and their
//! open pull requests. Nothing is ever written back to GitHub.

use super::http::{read_json, send};
use super::same_name;
use crate::config::GitHubSettings;
use crate::storage::to_iso8601;
use crate::Result;
use chrono::{DateTime, Utc};
use reqwest::{header, Client};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

/// Per-request timeout for listing calls
const GET_TIMEOUT: Duration = Duration::from_secs(10);

/// Largest page GitHub serves
const PER_PAGE: &str = "100";

/// GitHub API client
pub struct GitHubAdapter {
    client: Client,
    rest_base_url: String,
    account: String,
    auth_token: String,
}

/// Repository as returned by `GET /user/repos`
#[derive(Debug, Clone, Deserialize)]
struct GitHubRepo {
    name: String,
    #[serde(default)]
    private: bool,
    owner: GitHubUser,
}

#[derive(Debug, Clone, Deserialize)]
struct GitHubUser {
    login: String,
}

/// Issue or pull request as returned by the REST listing endpoints
#[derive(Debug, Clone, Deserialize)]
struct GitHubIssue {
    title: String,
    html_url: String,
    created_at: DateTime<Utc>,
    /// Present when an issue record is really a pull request
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

/// Repository selected for mirroring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    pub name: String,
    pub owner: String,
    pub is_private: bool,
}

impl RepositoryRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owner: owner.into(),
            is_private: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkKind {
    Issue,
    PullRequest,
}

/// An open issue or pull request to mirror
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub title: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub kind: WorkKind,
    pub source_repo: RepositoryRef,
}

impl WorkItem {
    fn from_issue(issue: GitHubIssue, kind: WorkKind, repo: &RepositoryRef) -> Self {
        Self {
            title: issue.title,
            url: issue.html_url,
            created_at: issue.created_at,
            kind,
            source_repo: repo.clone(),
        }
    }
}

impl GitHubAdapter {
    /// Create a new GitHub adapter
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(
        settings: &GitHubSettings,
        account: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers({
                let mut headers = header::HeaderMap::new();
                headers.insert(
                    header::USER_AGENT,
                    header::HeaderValue::from_static("GitHub-to-Todoist-Sync"),
                );
                headers.insert(
                    header::ACCEPT,
                    header::HeaderValue::from_static("application/vnd.github+json"),
                );
                headers
            })
            .build()?;

        Ok(Self {
            client,
            rest_base_url: settings.api_url.trim_end_matches('/').to_string(),
            account: account.into(),
            auth_token: token.into(),
        })
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        operation: &str,
    ) -> Result<T> {
        let url = format!("{}{}", self.rest_base_url, path);
        let request = self
            .client
            .get(&url)
            .query(query)
            .header(header::AUTHORIZATION, format!("token {}", self.auth_token))
            .timeout(GET_TIMEOUT);
        let response = send(request, "GitHub", operation).await?;

        read_json(response, "GitHub", operation).await
    }

    /// List public repositories owned by the configured account
    ///
    /// `/user/repos` also returns private repositories and ones the token can
    /// merely access; both are dropped here.
    pub async fn list_owned_public_repos(&self) -> Result<Vec<RepositoryRef>> {
        let repos: Vec<GitHubRepo> = self
            .get(
                "/user/repos",
                &[("per_page", PER_PAGE.to_string())],
                "list repositories",
            )
            .await?;

        // The token's own repos only: skip private ones and those of other owners
        let owned: Vec<RepositoryRef> = repos
            .into_iter()
            .filter(|r| !r.private && same_name(&r.owner.login, &self.account))
            .map(|r| RepositoryRef {
                name: r.name,
                owner: r.owner.login,
                is_private: r.private,
            })
            .collect();

        info!(
            count = owned.len(),
            repos = %owned.iter().map(|r| r.name.as_str()).collect::<Vec<_>>().join(", "),
            "Public owned repositories found"
        );

        Ok(owned)
    }

    /// List issues of a repository, excluding pull requests
    ///
    /// When `since` is given GitHub only returns issues updated at or after it.
    pub async fn list_issues(
        &self,
        repo: &RepositoryRef,
        since: Option<&DateTime<Utc>>,
    ) -> Result<Vec<WorkItem>> {
        let mut query = vec![("per_page", PER_PAGE.to_string())];
        // No watermark means a full backfill
        if let Some(since) = since {
            query.push(("since", to_iso8601(since)));
        }

        debug!(repo = %repo.name, since = ?since.map(to_iso8601), "Fetching GitHub issues");

        let issues: Vec<GitHubIssue> = self
            .get(
                &format!("/repos/{}/{}/issues", repo.owner, repo.name),
                &query,
                "list issues",
            )
            .await?;

        // The issues endpoint also returns pull requests; those come from list_open_pull_requests
        Ok(issues
            .into_iter()
            .filter(|i| i.pull_request.is_none())
            .map(|i| WorkItem::from_issue(i, WorkKind::Issue, repo))
            .collect())
    }

    /// List open pull requests of a repository
    pub async fn list_open_pull_requests(&self, repo: &RepositoryRef) -> Result<Vec<WorkItem>> {
        debug!(repo = %repo.name, "Fetching GitHub pull requests");

        let pulls: Vec<GitHubIssue> = self
            .get(
                &format!("/repos/{}/{}/pulls", repo.owner, repo.name),
                &[
                    ("state", "open".to_string()),
                    ("per_page", PER_PAGE.to_string()),
                ],
                "list pull requests",
            )
            .await?;

        Ok(pulls
            .into_iter()
            .map(|p| WorkItem::from_issue(p, WorkKind::PullRequest, repo))
            .collect())
    }
}
