mod cli;
mod workflow;

use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;
use uprun::config::Config;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::resolve(&cli.path, cli.config.as_deref())?;

    match cli.command {
        Commands::Check(lookup) => workflow::execute_check(&cli.path, &config, &lookup).await,
        Commands::Update {
            lookup,
            yes,
            no_progress,
        } => workflow::execute_update(&cli.path, &config, &lookup, yes, no_progress).await,
    }
}

// Logs go to stderr so they never interleave with previews on stdout.
fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "uprun=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
