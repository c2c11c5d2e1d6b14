//! In-memory [`GitHubApi`] used by the unit tests.

use std::{
    collections::HashMap,
    io,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use dormant_core::{config::OwnerKind, models::Repository};
use http::StatusCode;
use time::{OffsetDateTime, UtcDateTime};

use crate::{
    ApiError, Branch, BranchHead, CommitDetails, CommitSignature, GitHubApi, PageParams, RepoCommit,
};

pub enum Reply {
    Commits(Vec<RepoCommit>),
    Status(u16),
    Transport,
    Panic,
}

#[derive(Default)]
pub struct Fixture {
    pub repositories: Vec<Repository>,
    /// Every repository page is full, forever.
    pub endless_repositories: bool,
    pub failing_repository_page: Option<u32>,
    /// Keyed by repository name. Missing entries answer 404.
    pub commits: HashMap<String, Reply>,
    /// Keyed by repository name. Missing entries answer 404.
    pub branches: HashMap<String, Result<Vec<Branch>, u16>>,
    /// Keyed by commit SHA. Missing entries answer 404.
    pub heads: HashMap<String, Reply>,
    pub delay: Option<Duration>,
}

#[derive(Default)]
struct Counters {
    repository_pages: Mutex<Vec<(u32, u8)>>,
    commit_requests: Mutex<HashMap<String, usize>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

#[derive(Clone)]
pub struct FakeGitHub {
    fixture: Arc<Fixture>,
    counters: Arc<Counters>,
}

pub fn repo(name: &str) -> Repository { Repository { name: name.to_string() } }

pub fn commit_at(sha: &str, date: UtcDateTime) -> RepoCommit {
    RepoCommit {
        sha: sha.to_string(),
        commit: CommitDetails {
            committer: Some(CommitSignature {
                date: Some(OffsetDateTime::from_unix_timestamp(date.unix_timestamp()).unwrap()),
            }),
        },
    }
}

pub fn branch(name: &str, sha: &str) -> Branch {
    Branch { name: name.to_string(), commit: BranchHead { sha: sha.to_string() } }
}

/// Collects formatted log output while installed as the thread's default subscriber.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

impl CapturedLogs {
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

fn status(code: u16) -> ApiError {
    let status = StatusCode::from_u16(code).unwrap();
    ApiError::Status { status, message: status.canonical_reason().unwrap_or_default().to_string() }
}

impl FakeGitHub {
    pub fn new(fixture: Fixture) -> Self {
        Self { fixture: Arc::new(fixture), counters: Arc::default() }
    }

    /// (page, per_page) of every repository listing request, in order.
    pub fn repository_page_requests(&self) -> Vec<(u32, u8)> {
        self.counters.repository_pages.lock().unwrap().clone()
    }

    pub fn commit_requests(&self) -> HashMap<String, usize> {
        self.counters.commit_requests.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize { self.counters.max_in_flight.load(Ordering::SeqCst) }

    async fn enter(&self) {
        let current = self.counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if let Some(delay) = self.fixture.delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn exit(&self) { self.counters.in_flight.fetch_sub(1, Ordering::SeqCst); }

    fn reply(reply: Option<&Reply>, what: &str) -> Result<Vec<RepoCommit>, ApiError> {
        match reply {
            Some(Reply::Commits(commits)) => Ok(commits.clone()),
            Some(Reply::Status(code)) => Err(status(*code)),
            Some(Reply::Transport) => Err(anyhow::anyhow!("connection reset by peer").into()),
            Some(Reply::Panic) => panic!("simulated panic while fetching {what}"),
            None => Err(status(404)),
        }
    }
}

impl GitHubApi for FakeGitHub {
    async fn list_repositories(
        &self,
        _owner: &str,
        _kind: OwnerKind,
        params: PageParams,
    ) -> Result<Vec<Repository>, ApiError> {
        let page = params.page.unwrap_or(1);
        let per_page = params.per_page.unwrap_or(30);
        self.counters.repository_pages.lock().unwrap().push((page, per_page));
        if self.fixture.failing_repository_page == Some(page) {
            return Err(status(502));
        }
        if self.fixture.endless_repositories {
            return Ok((0..per_page).map(|i| repo(&format!("repo-{page}-{i}"))).collect());
        }
        let start = (page as usize - 1) * per_page as usize;
        Ok(self.fixture.repositories.iter().skip(start).take(per_page as usize).cloned().collect())
    }

    async fn latest_commits(&self, _owner: &str, repo: &str) -> Result<Vec<RepoCommit>, ApiError> {
        *self.counters.commit_requests.lock().unwrap().entry(repo.to_string()).or_default() += 1;
        self.enter().await;
        let result = Self::reply(self.fixture.commits.get(repo), repo);
        self.exit();
        result
    }

    async fn list_branches(
        &self,
        _owner: &str,
        repo: &str,
        params: PageParams,
    ) -> Result<Vec<Branch>, ApiError> {
        let page = params.page.unwrap_or(1) as usize;
        let per_page = params.per_page.unwrap_or(30) as usize;
        match self.fixture.branches.get(repo) {
            Some(Ok(branches)) => {
                Ok(branches.iter().skip((page - 1) * per_page).take(per_page).cloned().collect())
            }
            Some(Err(code)) => Err(status(*code)),
            None => Err(status(404)),
        }
    }

    async fn get_commit(
        &self,
        _owner: &str,
        repo: &str,
        sha: &str,
    ) -> Result<RepoCommit, ApiError> {
        *self.counters.commit_requests.lock().unwrap().entry(repo.to_string()).or_default() += 1;
        let commits = Self::reply(self.fixture.heads.get(sha), sha)?;
        commits.into_iter().next().ok_or_else(|| status(404))
    }
}
