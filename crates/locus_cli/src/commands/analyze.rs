use std::path::{Path, PathBuf};

use clap::ValueEnum;
use locus::Report;
use locus::table::{self, REPOSITORIES_FILE, USERS_FILE};

use crate::config::Config;

/// Output format for the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// One numbered line per question (default)
    #[default]
    Text,
    /// Display as JSON
    Json,
}

/// Load both tables from `dir` and answer the questions.
pub(crate) fn build_report(dir: &Path) -> Result<Report, locus::TableError> {
    let users = table::read_users(&dir.join(USERS_FILE))?;
    let repos = table::read_repositories(&dir.join(REPOSITORIES_FILE))?;
    tracing::debug!(users = users.len(), repositories = repos.len(), "Tables loaded");
    Ok(Report::build(&users, &repos))
}

pub(crate) fn render(report: &Report, output: OutputFormat) -> Result<String, serde_json::Error> {
    match output {
        OutputFormat::Text => Ok(report.to_string()),
        OutputFormat::Json => serde_json::to_string_pretty(report),
    }
}

pub(crate) fn handle_analyze(
    input_dir: Option<PathBuf>,
    output: OutputFormat,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = input_dir.unwrap_or_else(|| config.output.dir.clone());
    let report = build_report(&dir)?;
    println!("{}", render(&report, output)?);
    Ok(())
}
