use locus::CollectProgress;

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, event: CollectProgress) {
        match event {
            CollectProgress::SearchingUsers { query } => {
                tracing::info!(query = %query, "Searching users");
            }

            CollectProgress::FetchedUserPage {
                page,
                count,
                total_so_far,
            } => {
                tracing::info!(page, count, total_so_far, "Search page fetched");
            }

            CollectProgress::UserCollected { login } => {
                tracing::debug!(login = %login, "User fetched");
            }

            CollectProgress::UserSkipped { login, reason } => {
                tracing::warn!(login = %login, reason = %reason, "Skipped user");
            }

            CollectProgress::UsersComplete { total } => {
                tracing::info!(total, "User collection complete");
            }

            CollectProgress::FetchingRepos { login, index, of } => {
                tracing::info!(login = %login, index, of, "Fetching repositories");
            }

            CollectProgress::FetchedRepoPage { login, page, count } => {
                tracing::debug!(login = %login, page, count, "Repository page fetched");
            }

            CollectProgress::ReposComplete { login, total } => {
                tracing::debug!(login = %login, total, "Repositories fetched");
            }

            CollectProgress::TableWritten { path, rows } => {
                tracing::info!(path = %path.display(), rows, "Table saved");
            }

            CollectProgress::Warning { message } => {
                tracing::warn!("{}", message);
            }

            _ => {}
        }
    }
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}
