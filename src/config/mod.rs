pub mod toml_config;

pub use toml_config::RulesetConfig;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "ruleset-merge")]
#[command(about = "Fetch, filter and merge proxy rule lists into Surge and Quantumult X files")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "rules.toml")]
    pub config: String,

    /// Override output.dir from config
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Show what would be processed without fetching or writing
    #[arg(long)]
    pub dry_run: bool,
}
