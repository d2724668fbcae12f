use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "uprun",
    about = "Plan, preview and apply Gradle version catalog updates",
    version,
    author
)]
pub struct Cli {
    /// Path to the project directory (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    pub path: PathBuf,

    /// Config file (defaults to uprun.toml in the project directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check for available dependency updates without applying them
    Check(LookupArgs),

    /// Preview, confirm and apply dependency updates
    Update {
        #[command(flatten)]
        lookup: LookupArgs,

        /// Apply without asking for confirmation
        #[arg(short, long)]
        yes: bool,

        /// Do not draw a progress bar while applying
        #[arg(long)]
        no_progress: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct LookupArgs {
    /// Include unstable versions (alpha, beta, RC)
    #[arg(long)]
    pub include_unstable: bool,

    /// Filter dependencies by name using glob syntax (e.g. "*okhttp*")
    #[arg(long, value_name = "GLOB")]
    pub filter: Option<String>,

    /// Read available versions from a JSON file instead of remote repositories
    #[arg(long, value_name = "FILE")]
    pub versions: Option<PathBuf>,
}
