use anyhow::{Context, Result, bail};
use dormant_core::{
    config::ResolveMode,
    models::{CommitDate, Unresolved},
};
use time::UtcDateTime;

use crate::{
    ApiError, GitHubApi,
    list::{PageLimits, list_branches},
};

/// Determine when a repository was last committed to.
///
/// Never fails: an empty repository resolves to [`Unresolved::Empty`] silently, and any
/// other failure is logged and resolves to [`Unresolved::Failed`].
pub async fn resolve_commit_date<A: GitHubApi>(
    api: &A,
    owner: &str,
    repo: &str,
    mode: ResolveMode,
    limits: PageLimits,
) -> CommitDate {
    let result = match mode {
        ResolveMode::LatestCommit => latest_commit_date(api, owner, repo).await,
        ResolveMode::AllBranches => newest_branch_date(api, owner, repo, limits).await,
    };
    match result {
        Ok(Some(date)) => CommitDate::Resolved(date),
        Ok(None) => {
            tracing::debug!("Repository {}/{} has no commits", owner, repo);
            CommitDate::Unresolved(Unresolved::Empty)
        }
        Err(e) => {
            tracing::error!("Failed to fetch last commit for {}/{}: {:?}", owner, repo, e);
            CommitDate::Unresolved(Unresolved::Failed)
        }
    }
}

async fn latest_commit_date<A: GitHubApi>(
    api: &A,
    owner: &str,
    repo: &str,
) -> Result<Option<UtcDateTime>> {
    let commits = match api.latest_commits(owner, repo).await {
        Ok(commits) => commits,
        Err(e) if e.is_empty_repository() => return Ok(None),
        Err(e) => return Err(e).context("Failed to fetch commits"),
    };
    let commit = commits.first().context("Commit list is empty")?;
    let date = commit
        .committed_at()
        .with_context(|| format!("Commit {} has no committer date", commit.sha))?;
    Ok(Some(date))
}

/// Newest head commit date across all branches. Branches whose head can't be fetched are skipped.
async fn newest_branch_date<A: GitHubApi>(
    api: &A,
    owner: &str,
    repo: &str,
    limits: PageLimits,
) -> Result<Option<UtcDateTime>> {
    let branches = match list_branches(api, owner, repo, limits).await {
        Ok(branches) => branches,
        Err(e) if e.downcast_ref::<ApiError>().is_some_and(ApiError::is_empty_repository) => {
            return Ok(None);
        }
        Err(e) => return Err(e),
    };
    if branches.is_empty() {
        return Ok(None);
    }
    let mut newest = None;
    for branch in &branches {
        match api.get_commit(owner, repo, &branch.commit.sha).await {
            Ok(commit) => match commit.committed_at() {
                Some(date) => newest = newest.max(Some(date)),
                None => tracing::warn!(
                    "Head of branch {} in {}/{} has no committer date",
                    branch.name,
                    owner,
                    repo
                ),
            },
            Err(e) => {
                tracing::warn!(
                    "Failed to fetch head of branch {} in {}/{}: {}",
                    branch.name,
                    owner,
                    repo,
                    e
                );
            }
        }
    }
    match newest {
        Some(date) => Ok(Some(date)),
        None => bail!("No commit date found on any of {} branches", branches.len()),
    }
}
