use std::{fmt, path::PathBuf, str::FromStr};

use anyhow::{Result, bail, ensure};
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_CONCURRENCY: usize = 10;
pub const DEFAULT_PAGE_SIZE: u8 = 100;
pub const DEFAULT_MAX_PAGES: u32 = 1000;
pub const DEFAULT_INACTIVE_MONTHS: u32 = 6;
pub const DEFAULT_OUTPUT: &str = "inactive_repos.txt";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GitHubConfig {
    /// Personal access token, sent as a bearer token.
    pub token: Option<String>,
    /// API root, for GitHub Enterprise. Defaults to https://api.github.com.
    pub api_url: Option<Url>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    pub owner: Option<String>,
    pub owner_kind: OwnerKind,
    pub mode: ResolveMode,
    pub concurrency: usize,
    pub page_size: u8,
    pub max_pages: u32,
    pub inactive_months: u32,
    pub output: PathBuf,
    pub format: ReportFormat,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            owner: None,
            owner_kind: OwnerKind::default(),
            mode: ResolveMode::default(),
            concurrency: DEFAULT_CONCURRENCY,
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            inactive_months: DEFAULT_INACTIVE_MONTHS,
            output: PathBuf::from(DEFAULT_OUTPUT),
            format: ReportFormat::default(),
        }
    }
}

impl Config {
    /// Checks everything that can be checked without touching the network.
    pub fn validate(&self) -> Result<()> {
        match self.github.token.as_deref() {
            Some(token) if !token.trim().is_empty() => {}
            _ => {
                bail!("Missing GitHub token. Set GITHUB_TOKEN or github.token in the config file.")
            }
        }
        if let Some(api_url) = &self.github.api_url {
            ensure!(
                matches!(api_url.scheme(), "http" | "https"),
                "Unsupported GitHub API URL scheme: {}",
                api_url
            );
        }
        match self.scan.owner.as_deref() {
            Some(owner) if !owner.trim().is_empty() => {}
            _ => bail!("Missing organization or user to scan"),
        }
        ensure!(self.scan.concurrency >= 1, "Concurrency must be at least 1");
        ensure!(
            (1..=100).contains(&self.scan.page_size),
            "Page size must be between 1 and 100 (got {})",
            self.scan.page_size
        );
        ensure!(self.scan.max_pages >= 1, "Maximum page count must be at least 1");
        Ok(())
    }
}

/// Which listing endpoint the owner is enumerated through.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OwnerKind {
    #[default]
    Org,
    User,
}

impl OwnerKind {
    pub const fn variants() -> &'static [Self] { &[Self::Org, Self::User] }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Org => "org",
            Self::User => "user",
        }
    }

    /// Path prefix of the repository listing route.
    pub fn route_prefix(&self) -> &'static str {
        match self {
            Self::Org => "orgs",
            Self::User => "users",
        }
    }
}

impl FromStr for OwnerKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "org" | "orgs" | "organization" => Ok(Self::Org),
            "user" | "users" => Ok(Self::User),
            _ => Err(()),
        }
    }
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Org => "organization",
            Self::User => "user",
        })
    }
}

/// How the last commit date of a repository is determined.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResolveMode {
    /// Most recent commit on the default branch.
    #[default]
    LatestCommit,
    /// Newest head commit across all branches.
    AllBranches,
}

impl ResolveMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LatestCommit => "latest_commit",
            Self::AllBranches => "all_branches",
        }
    }
}

impl fmt::Display for ResolveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Repository names, one per line.
    #[default]
    Plain,
    /// Header line followed by a bulleted list.
    Summary,
}

impl ReportFormat {
    pub const fn variants() -> &'static [Self] { &[Self::Plain, Self::Summary] }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Summary => "summary",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plain" => Ok(Self::Plain),
            "summary" => Ok(Self::Summary),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}
