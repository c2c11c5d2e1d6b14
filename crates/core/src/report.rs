use std::fmt::Write;

use crate::config::{ReportFormat, ResolveMode};

/// Render the inactive repository names for the output file.
pub fn render(names: &[String], format: ReportFormat, mode: ResolveMode, months: u32) -> String {
    match format {
        ReportFormat::Plain => names.join("\n"),
        ReportFormat::Summary if names.is_empty() => "All repositories are active.\n".to_string(),
        ReportFormat::Summary => {
            let scope = match mode {
                ResolveMode::LatestCommit => "in the last",
                ResolveMode::AllBranches => "in any branch in",
            };
            let mut out = format!("Inactive Repositories (no commits {scope} {months} months):\n");
            for name in names {
                writeln!(out, "- {name}").ok();
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> { values.iter().map(|s| s.to_string()).collect() }

    #[test]
    fn test_render_plain() {
        let stale = names(&["stale-repo", "empty-repo"]);
        for mode in [ResolveMode::LatestCommit, ResolveMode::AllBranches] {
            assert_eq!(render(&stale, ReportFormat::Plain, mode, 6), "stale-repo\nempty-repo");
            assert_eq!(render(&[], ReportFormat::Plain, mode, 6), "");
        }
    }

    #[test]
    fn test_render_summary() {
        let stale = names(&["stale-repo", "empty-repo"]);
        assert_eq!(
            render(&stale, ReportFormat::Summary, ResolveMode::LatestCommit, 6),
            "Inactive Repositories (no commits in the last 6 months):\n- stale-repo\n- empty-repo\n"
        );
        assert_eq!(
            render(&[], ReportFormat::Summary, ResolveMode::LatestCommit, 12),
            "All repositories are active.\n"
        );
    }

    #[test]
    fn test_render_summary_all_branches() {
        assert_eq!(
            render(&names(&["stale-repo"]), ReportFormat::Summary, ResolveMode::AllBranches, 6),
            "Inactive Repositories (no commits in any branch in 6 months):\n- stale-repo\n"
        );
        assert_eq!(
            render(&[], ReportFormat::Summary, ResolveMode::AllBranches, 6),
            "All repositories are active.\n"
        );
    }
}
