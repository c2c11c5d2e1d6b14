pub mod list;
pub mod resolve;
pub mod scan;

#[cfg(test)]
mod fake;

use std::future::Future;

use anyhow::{Context, Result};
use dormant_core::{
    config::{GitHubConfig, OwnerKind},
    models::Repository,
};
use http::StatusCode;
use octocrab::{GitHubError, Octocrab};
use serde::Deserialize;
use time::{OffsetDateTime, UtcDateTime};

/// Error from a single GitHub API request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("GitHub API returned {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Other(_) => None,
        }
    }

    /// GitHub answers 409 Conflict for commit and branch listings of empty repositories.
    pub fn is_empty_repository(&self) -> bool { self.status() == Some(StatusCode::CONFLICT) }
}

impl From<octocrab::Error> for ApiError {
    fn from(err: octocrab::Error) -> Self {
        match err {
            octocrab::Error::GitHub { source, .. } => {
                let GitHubError { status_code, message, .. } = *source;
                Self::Status { status: status_code, message }
            }
            err => Self::Other(err.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct PageParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

/// An entry of `GET /repos/{owner}/{repo}/commits`, or the body of a single commit.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoCommit {
    pub sha: String,
    pub commit: CommitDetails,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitDetails {
    pub committer: Option<CommitSignature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitSignature {
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
}

impl RepoCommit {
    pub fn committed_at(&self) -> Option<UtcDateTime> {
        self.commit.committer.as_ref()?.date.map(OffsetDateTime::to_utc)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Branch {
    pub name: String,
    pub commit: BranchHead,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BranchHead {
    pub sha: String,
}

/// The GitHub REST endpoints a scan needs.
pub trait GitHubApi: Clone + Send + Sync + 'static {
    /// `GET /orgs/{owner}/repos` or `GET /users/{owner}/repos`
    fn list_repositories(
        &self,
        owner: &str,
        kind: OwnerKind,
        params: PageParams,
    ) -> impl Future<Output = Result<Vec<Repository>, ApiError>> + Send;

    /// `GET /repos/{owner}/{repo}/commits?per_page=1`
    fn latest_commits(
        &self,
        owner: &str,
        repo: &str,
    ) -> impl Future<Output = Result<Vec<RepoCommit>, ApiError>> + Send;

    /// `GET /repos/{owner}/{repo}/branches`
    fn list_branches(
        &self,
        owner: &str,
        repo: &str,
        params: PageParams,
    ) -> impl Future<Output = Result<Vec<Branch>, ApiError>> + Send;

    /// `GET /repos/{owner}/{repo}/commits/{sha}`
    fn get_commit(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
    ) -> impl Future<Output = Result<RepoCommit, ApiError>> + Send;
}

#[derive(Clone)]
pub struct GitHub {
    pub client: Octocrab,
}

impl GitHub {
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        let token = config.token.clone().context("Missing GitHub token")?;
        let mut builder = Octocrab::builder().personal_token(token);
        if let Some(api_url) = &config.api_url {
            builder = builder
                .base_uri(api_url.as_str())
                .with_context(|| format!("Invalid GitHub API URL {api_url}"))?;
        }
        let client = builder.build().context("Failed to create GitHub client")?;
        Ok(Self { client })
    }
}

impl GitHubApi for GitHub {
    async fn list_repositories(
        &self,
        owner: &str,
        kind: OwnerKind,
        params: PageParams,
    ) -> Result<Vec<Repository>, ApiError> {
        let route = format!("/{}/{owner}/repos", kind.route_prefix());
        Ok(self.client.get(route, Some(&params)).await?)
    }

    async fn latest_commits(&self, owner: &str, repo: &str) -> Result<Vec<RepoCommit>, ApiError> {
        let params = PageParams { per_page: Some(1), page: None };
        Ok(self.client.get(format!("/repos/{owner}/{repo}/commits"), Some(&params)).await?)
    }

    async fn list_branches(
        &self,
        owner: &str,
        repo: &str,
        params: PageParams,
    ) -> Result<Vec<Branch>, ApiError> {
        Ok(self.client.get(format!("/repos/{owner}/{repo}/branches"), Some(&params)).await?)
    }

    async fn get_commit(&self, owner: &str, repo: &str, sha: &str) -> Result<RepoCommit, ApiError> {
        Ok(self.client.get(format!("/repos/{owner}/{repo}/commits/{sha}"), None::<&()>).await?)
    }
}
