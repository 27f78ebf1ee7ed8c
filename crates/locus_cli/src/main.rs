//! Locus CLI - command-line interface for the forge census collector.

mod commands;
mod config;
mod progress;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::Term;
use tracing_subscriber::EnvFilter;

use crate::commands::analyze::OutputFormat;
use crate::commands::collect::CollectArgs;

#[derive(Parser)]
#[command(name = "locus")]
#[command(version)]
#[command(about = "Collect and analyze GitHub users of one location")]
#[command(
    long_about = "Locus searches GitHub for users in a location above a follower threshold, \
looks up each profile, lists their repositories, and writes users.csv and \
repositories.csv. The analyze command answers a fixed set of questions about \
the collected tables."
)]
#[command(after_long_help = r#"EXAMPLES
    Collect users in Bangalore with more than 100 followers:
        $ locus collect

    Collect a different city into another directory:
        $ locus collect --location "San Francisco" --min-followers 500 --output-dir sf

    Print the report as JSON:
        $ locus analyze --input-dir sf --output json

CONFIGURATION
    Locus reads configuration from:
      1. ~/.config/locus/config.toml (or $XDG_CONFIG_HOME/locus/config.toml)
      2. ./locus.toml
      3. Environment variables (LOCUS_* prefix, e.g., LOCUS_COLLECT__MIN_FOLLOWERS)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    LOCUS_GITHUB__TOKEN       GitHub personal access token
    GITHUB_TOKEN              Used when no token is configured otherwise
    LOCUS_GITHUB__API_URL     API root (default: https://api.github.com)
    LOCUS_OUTPUT__DIR         Output directory (default: data)
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect users and their repositories into CSV tables
    Collect {
        #[command(flatten)]
        args: CollectArgs,
    },
    /// Answer the fixed questions over previously collected tables
    Analyze {
        /// Directory holding users.csv and repositories.csv (default from config or "data")
        #[arg(short, long)]
        input_dir: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Progress bars take over the terminal; only log when not on a TTY.
    if !Term::stdout().is_term() {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::new("locus=info,locus_cli=info"),
        };

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    // Load configuration (config file -> env vars -> defaults)
    let config = config::Config::load();

    let cli = Cli::parse();

    match cli.command {
        Commands::Collect { args } => {
            commands::collect::handle_collect(args, &config).await?;
        }
        Commands::Analyze { input_dir, output } => {
            commands::analyze::handle_analyze(input_dir, output, &config)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn collect_flags_parse() {
        let cli = Cli::try_parse_from([
            "locus",
            "collect",
            "--location",
            "New York",
            "--min-followers",
            "250",
            "--delay-ms",
            "500",
            "--no-verify",
        ])
        .unwrap();

        let Commands::Collect { args } = cli.command else {
            panic!("expected collect");
        };
        assert_eq!(args.location.as_deref(), Some("New York"));
        assert_eq!(args.min_followers, Some(250));
        assert_eq!(args.delay_ms, Some(500));
        assert!(args.no_verify);
        assert!(args.output_dir.is_none());
    }

    #[test]
    fn analyze_defaults_to_text() {
        let cli = Cli::try_parse_from(["locus", "analyze"]).unwrap();
        let Commands::Analyze { input_dir, output } = cli.command else {
            panic!("expected analyze");
        };
        assert!(input_dir.is_none());
        assert_eq!(output, OutputFormat::Text);
    }

    #[test]
    fn analyze_accepts_json_output() {
        let cli = Cli::try_parse_from(["locus", "analyze", "-o", "json", "-i", "out"]).unwrap();
        let Commands::Analyze { input_dir, output } = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(input_dir, Some(PathBuf::from("out")));
        assert_eq!(output, OutputFormat::Json);
    }
}
