use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use argp::FromArgs;
use dormant_core::{
    config::{Config, OwnerKind, ReportFormat, ResolveMode},
    models::Cutoff,
    report,
};
use dormant_github::{
    GitHub,
    scan::{ScanOptions, scan},
};
use time::UtcDateTime;
use typed_path::Utf8NativePathBuf;
use url::Url;

use crate::util::{native_path, parse_format, parse_owner_kind, parse_url};

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// List repositories without recent commits and write their names to a file.
#[argp(subcommand, name = "scan")]
pub struct Args {
    #[argp(positional)]
    /// organization or user to scan
    owner: Option<String>,
    #[argp(option, short = 'k', from_str_fn(parse_owner_kind))]
    /// owner kind: org or user (default: org)
    kind: Option<OwnerKind>,
    #[argp(option, short = 'c', from_str_fn(native_path))]
    /// YAML config file
    config: Option<Utf8NativePathBuf>,
    #[argp(option, short = 'o', from_str_fn(native_path))]
    /// write inactive repository names to output file (default: inactive_repos.txt)
    output: Option<Utf8NativePathBuf>,
    #[argp(option, short = 'f', from_str_fn(parse_format))]
    /// output file format: plain or summary (default: plain)
    format: Option<ReportFormat>,
    #[argp(option, short = 'j')]
    /// maximum concurrent commit lookups (default: 10)
    concurrency: Option<usize>,
    #[argp(option, short = 'm')]
    /// months without commits before a repository is inactive (default: 6)
    months: Option<u32>,
    #[argp(option)]
    /// give up listing after this many full pages (default: 1000)
    max_pages: Option<u32>,
    #[argp(switch)]
    /// use the newest head commit of any branch instead of the latest commit
    all_branches: bool,
    #[argp(option, from_str_fn(parse_url))]
    /// GitHub API base URL (default: https://api.github.com)
    api_url: Option<Url>,
}

pub async fn run(args: Args) -> Result<()> {
    let file_config = match &args.config {
        Some(path) => Some(load_config(path)?),
        None => None,
    };
    let config = build_config(&args, file_config, std::env::var("GITHUB_TOKEN").ok())?;
    let github = GitHub::new(&config.github)?;
    let options = ScanOptions::from_config(&config.scan)?;
    let months = config.scan.inactive_months;
    let cutoff = Cutoff::months_before(UtcDateTime::now(), months)?;
    tracing::info!(
        "Scanning {} {} for repositories without commits since {} (mode: {})",
        options.owner_kind,
        options.owner,
        cutoff,
        options.mode
    );

    let report = scan(&github, &options, cutoff).await?;
    let output = &config.scan.output;
    write_report(output, &report.inactive, config.scan.format, options.mode, months)?;
    tracing::info!(
        "Repositories with no commits in the last {} months: {:?}",
        months,
        report.inactive
    );
    tracing::info!(
        "{} of {} repositories inactive, saved to {}",
        report.inactive.len(),
        report.resolutions.len(),
        output.display()
    );
    Ok(())
}

/// Replaces any existing content of `path`.
fn write_report(
    path: &Path,
    names: &[String],
    format: ReportFormat,
    mode: ResolveMode,
    months: u32,
) -> Result<()> {
    let contents = report::render(names, format, mode, months);
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write output file '{}'", path.display()))
}

fn load_config(path: &Utf8NativePathBuf) -> Result<Config> {
    let file = File::open(path.with_platform_encoding())
        .with_context(|| format!("Failed to open config file '{}'", path))?;
    serde_yaml::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse config file '{}'", path))
}

/// Defaults, then the config file, then `GITHUB_TOKEN`, then command-line options.
fn build_config(args: &Args, file: Option<Config>, env_token: Option<String>) -> Result<Config> {
    let mut config = file.unwrap_or_default();
    if let Some(token) = env_token.filter(|token| !token.is_empty()) {
        config.github.token = Some(token);
    }
    if let Some(api_url) = &args.api_url {
        config.github.api_url = Some(api_url.clone());
    }
    let scan_config = &mut config.scan;
    if let Some(owner) = &args.owner {
        scan_config.owner = Some(owner.clone());
    }
    if let Some(kind) = args.kind {
        scan_config.owner_kind = kind;
    }
    if args.all_branches {
        scan_config.mode = ResolveMode::AllBranches;
    }
    if let Some(concurrency) = args.concurrency {
        scan_config.concurrency = concurrency;
    }
    if let Some(months) = args.months {
        scan_config.inactive_months = months;
    }
    if let Some(max_pages) = args.max_pages {
        scan_config.max_pages = max_pages;
    }
    if let Some(format) = args.format {
        scan_config.format = format;
    }
    if let Some(output) = &args.output {
        scan_config.output = PathBuf::from(output.as_str());
    }
    config.validate()?;
    Ok(config)
}
