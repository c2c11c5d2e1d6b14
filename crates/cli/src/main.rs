mod cmd;
mod util;

use anyhow::Result;
use argp::FromArgs;
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

#[derive(FromArgs, PartialEq, Debug)]
/// Find GitHub repositories that have gone without commits.
struct TopLevel {
    #[argp(switch, short = 'v')]
    /// log debug output (RUST_LOG takes precedence)
    verbose: bool,
    #[argp(subcommand)]
    command: SubCommand,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argp(subcommand)]
enum SubCommand {
    Scan(cmd::scan::Args),
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: TopLevel = argp::parse_args_or_exit(argp::DEFAULT);

    let default_level = if args.verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    let env_filter =
        EnvFilter::builder().with_default_directive(default_level.into()).from_env_lossy();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(env_filter))
        .init();

    match args.command {
        SubCommand::Scan(args) => cmd::scan::run(args).await,
    }
}
