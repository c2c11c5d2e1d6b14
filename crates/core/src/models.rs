use std::fmt;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use time::UtcDateTime;

use crate::util::sub_months;

/// A repository as returned by the listing endpoints. Fields not named here are ignored.
#[derive(Debug, Clone, Eq, PartialEq, Default, Deserialize, Serialize)]
pub struct Repository {
    pub name: String,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Unresolved {
    /// The repository has no commits (HTTP 409, or no branches).
    Empty,
    /// The lookup failed; the cause has already been logged.
    Failed,
}

/// Outcome of looking up the last commit of a repository.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CommitDate {
    Resolved(UtcDateTime),
    Unresolved(Unresolved),
}

impl fmt::Display for CommitDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved(date) => write!(f, "{}", date),
            Self::Unresolved(Unresolved::Empty) => f.write_str("no commits"),
            Self::Unresolved(Unresolved::Failed) => f.write_str("unknown"),
        }
    }
}

/// Point in time before which a repository's last commit makes it inactive.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
pub struct Cutoff(UtcDateTime);

impl Cutoff {
    pub fn at(timestamp: UtcDateTime) -> Self { Self(timestamp) }

    /// `now` minus the given number of calendar months, clamped to the end of shorter months.
    pub fn months_before(now: UtcDateTime, months: u32) -> Result<Self> {
        sub_months(now, months)
            .map(Self)
            .with_context(|| format!("Failed to compute a cutoff {months} months before {now}"))
    }

    pub fn timestamp(&self) -> UtcDateTime { self.0 }

    /// Unknown dates count as inactive. A commit exactly at the cutoff is still active.
    pub fn is_inactive(&self, date: &CommitDate) -> bool {
        match date {
            CommitDate::Resolved(date) => *date < self.0,
            CommitDate::Unresolved(_) => true,
        }
    }
}

impl fmt::Display for Cutoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// A repository paired with its resolved last commit date.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Resolution {
    pub repository: Repository,
    pub commit_date: CommitDate,
}
