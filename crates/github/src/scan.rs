use std::{collections::HashMap, sync::Arc};

use anyhow::{Context, Result};
use dormant_core::{
    config::{OwnerKind, ResolveMode, ScanConfig},
    models::{CommitDate, Cutoff, Repository, Resolution, Unresolved},
};
use tokio::{sync::Semaphore, task::JoinSet};

use crate::{
    GitHubApi,
    list::{PageLimits, list_repositories},
    resolve::resolve_commit_date,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub owner: String,
    pub owner_kind: OwnerKind,
    pub mode: ResolveMode,
    pub concurrency: usize,
    pub limits: PageLimits,
}

impl ScanOptions {
    pub fn from_config(config: &ScanConfig) -> Result<Self> {
        let owner = config.owner.clone().context("Missing organization or user to scan")?;
        Ok(Self {
            owner,
            owner_kind: config.owner_kind,
            mode: config.mode,
            concurrency: config.concurrency.max(1),
            limits: PageLimits { per_page: config.page_size, max_pages: config.max_pages },
        })
    }
}

pub struct ScanReport {
    /// One entry per listed repository, in completion order.
    pub resolutions: Vec<Resolution>,
    /// Names of inactive repositories, in completion order.
    pub inactive: Vec<String>,
}

/// List every repository of the owner, resolve their last commit dates and collect the
/// ones that are inactive as of `cutoff`. Only a failure to list repositories is fatal.
pub async fn scan<A: GitHubApi>(
    api: &A,
    options: &ScanOptions,
    cutoff: Cutoff,
) -> Result<ScanReport> {
    let repositories =
        list_repositories(api, &options.owner, options.owner_kind, options.limits).await?;
    tracing::info!(
        "Found {} repositories for {} {}",
        repositories.len(),
        options.owner_kind,
        options.owner
    );
    let mut inactive = Vec::new();
    let resolutions = resolve_all(api, options, repositories, |resolution| {
        if cutoff.is_inactive(&resolution.commit_date) {
            tracing::info!(
                "Inactive repository: {} (last commit: {})",
                resolution.repository.name,
                resolution.commit_date
            );
            inactive.push(resolution.repository.name.clone());
        }
    })
    .await;
    Ok(ScanReport { resolutions, inactive })
}

/// Resolve every repository with at most `options.concurrency` lookups in flight, calling
/// `on_resolved` from this task as each one completes. Returns once all have completed.
pub async fn resolve_all<A: GitHubApi>(
    api: &A,
    options: &ScanOptions,
    repositories: Vec<Repository>,
    mut on_resolved: impl FnMut(&Resolution),
) -> Vec<Resolution> {
    let sem = Arc::new(Semaphore::new(options.concurrency));
    let owner: Arc<str> = Arc::from(options.owner.as_str());
    let mut pending = HashMap::with_capacity(repositories.len());
    let mut set = JoinSet::new();
    for repository in repositories {
        let sem = sem.clone();
        let api = api.clone();
        let owner = owner.clone();
        let (mode, limits) = (options.mode, options.limits);
        let task_repository = repository.clone();
        let handle = set.spawn(async move {
            let commit_date =
                resolve_with_permit(&sem, &api, &owner, &task_repository.name, mode, limits).await;
            Resolution { repository: task_repository, commit_date }
        });
        pending.insert(handle.id(), repository);
    }

    let mut resolutions = Vec::with_capacity(pending.len());
    while let Some(join_result) = set.join_next_with_id().await {
        let resolution = match join_result {
            Ok((id, resolution)) => {
                pending.remove(&id);
                resolution
            }
            Err(e) => {
                let Some(repository) = pending.remove(&e.id()) else {
                    tracing::error!("Lost track of a failed lookup: {:?}", e);
                    continue;
                };
                tracing::error!("Failed to resolve {}/{}: {:?}", owner, repository.name, e);
                Resolution { repository, commit_date: CommitDate::Unresolved(Unresolved::Failed) }
            }
        };
        tracing::debug!("Resolved {}: {}", resolution.repository.name, resolution.commit_date);
        on_resolved(&resolution);
        resolutions.push(resolution);
    }
    resolutions
}

async fn resolve_with_permit<A: GitHubApi>(
    sem: &Semaphore,
    api: &A,
    owner: &str,
    repo: &str,
    mode: ResolveMode,
    limits: PageLimits,
) -> CommitDate {
    let _permit = match sem.acquire().await {
        Ok(permit) => permit,
        Err(e) => {
            tracing::error!("Failed to acquire a lookup slot for {}/{}: {:?}", owner, repo, e);
            return CommitDate::Unresolved(Unresolved::Failed);
        }
    };
    resolve_commit_date(api, owner, repo, mode, limits).await
}
