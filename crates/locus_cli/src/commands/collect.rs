use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use console::Term;
use locus::{Pipeline, PipelineOptions, RateLimitedClient};

use crate::config::Config;
use crate::progress::ProgressReporter;

/// Command-line overrides for `locus collect`.
#[derive(Debug, Clone, Default, clap::Args)]
pub(crate) struct CollectArgs {
    /// Location to search for (default from config or "Bangalore")
    #[arg(short, long)]
    pub location: Option<String>,

    /// Only include users with more followers than this (default from config or 100)
    #[arg(short = 'f', long)]
    pub min_followers: Option<u64>,

    /// Directory to write users.csv and repositories.csv into (default from config or "data")
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Pause after every request, in milliseconds (default from config or 1000)
    #[arg(short = 'd', long)]
    pub delay_ms: Option<u64>,

    /// Skip the token check before collecting
    #[arg(long)]
    pub no_verify: bool,
}

impl CollectArgs {
    /// Merge CLI args with config defaults.
    fn pipeline_options(&self, config: &Config) -> PipelineOptions {
        PipelineOptions {
            location: self
                .location
                .clone()
                .unwrap_or_else(|| config.collect.location.clone()),
            min_followers: self.min_followers.unwrap_or(config.collect.min_followers),
            output_dir: self
                .output_dir
                .clone()
                .unwrap_or_else(|| config.output.dir.clone()),
            verify_credentials: !self.no_verify && config.collect.verify_token,
        }
    }
}

pub(crate) async fn handle_collect(
    args: CollectArgs,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let token = config.github_token()?;

    let mut client_options = config.client_options();
    if let Some(delay_ms) = args.delay_ms {
        client_options.request_delay = Duration::from_millis(delay_ms);
    }
    let client = RateLimitedClient::new(&token, client_options)?;
    let options = args.pipeline_options(config);

    let is_tty = Term::stdout().is_term();
    if is_tty {
        println!(
            "Collecting users in {} with more than {} followers...\n",
            options.location, options.min_followers
        );
    } else {
        tracing::info!(
            location = %options.location,
            min_followers = options.min_followers,
            output_dir = %options.output_dir.display(),
            "Starting collection"
        );
    }

    let reporter = Arc::new(ProgressReporter::new());
    let callback = reporter.as_callback();
    let result = Pipeline::new(&client, options)
        .with_progress(Some(&callback))
        .run()
        .await;
    reporter.finish();

    let (users, repos) = result?;
    if is_tty {
        println!(
            "\nCollected {} users and {} repositories.",
            users.len(),
            repos.len()
        );
    } else {
        tracing::info!(
            users = users.len(),
            repositories = repos.len(),
            "Collection complete"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_options_fall_back_to_config() {
        let config = Config::default();
        let options = CollectArgs::default().pipeline_options(&config);

        assert_eq!(options.location, "Bangalore");
        assert_eq!(options.min_followers, 100);
        assert_eq!(options.output_dir, PathBuf::from("data"));
        assert!(options.verify_credentials);
    }

    #[test]
    fn pipeline_options_prefer_flags() {
        let config = Config::default();
        let args = CollectArgs {
            location: Some("San Francisco".to_string()),
            min_followers: Some(500),
            output_dir: Some(PathBuf::from("out")),
            delay_ms: Some(10),
            no_verify: true,
        };

        let options = args.pipeline_options(&config);

        assert_eq!(options.location, "San Francisco");
        assert_eq!(options.min_followers, 500);
        assert_eq!(options.output_dir, PathBuf::from("out"));
        assert!(!options.verify_credentials);
    }

    #[test]
    fn verification_disabled_in_config_stays_disabled() {
        let mut config = Config::default();
        config.collect.verify_token = false;

        let options = CollectArgs::default().pipeline_options(&config);

        assert!(!options.verify_credentials);
    }
}
