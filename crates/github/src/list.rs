use std::future::Future;

use anyhow::{Context, Result, bail};
use dormant_core::{config::OwnerKind, models::Repository};

use crate::{ApiError, Branch, GitHubApi, PageParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub per_page: u8,
    pub max_pages: u32,
}

/// Fetch pages sequentially until one comes back short.
/// Fails if `max_pages` pages were all full, since the API would otherwise be polled forever.
pub async fn paginate<T, F, Fut>(limits: PageLimits, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(PageParams) -> Fut,
    Fut: Future<Output = Result<Vec<T>, ApiError>>,
{
    let mut items = Vec::new();
    let mut page = 1u32;
    loop {
        let batch = fetch(PageParams { per_page: Some(limits.per_page), page: Some(page) })
            .await
            .with_context(|| format!("Failed to fetch page {page}"))?;
        let len = batch.len();
        items.extend(batch);
        if len < limits.per_page as usize {
            break;
        }
        if page >= limits.max_pages {
            bail!("Every page up to the limit of {} was full ({} items)", page, items.len());
        }
        page += 1;
    }
    Ok(items)
}

pub async fn list_repositories<A: GitHubApi>(
    api: &A,
    owner: &str,
    kind: OwnerKind,
    limits: PageLimits,
) -> Result<Vec<Repository>> {
    paginate(limits, move |params| api.list_repositories(owner, kind, params))
        .await
        .with_context(|| format!("Failed to list repositories for {kind} {owner}"))
}

pub async fn list_branches<A: GitHubApi>(
    api: &A,
    owner: &str,
    repo: &str,
    limits: PageLimits,
) -> Result<Vec<Branch>> {
    paginate(limits, move |params| api.list_branches(owner, repo, params))
        .await
        .with_context(|| format!("Failed to list branches of {owner}/{repo}"))
}
