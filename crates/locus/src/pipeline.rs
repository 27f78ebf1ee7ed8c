//! End-to-end collection run.
//!
//! A run verifies the token, collects users once, writes `users.csv`, lists
//! the repositories of every collected user in collection order, and writes
//! `repositories.csv` once at the end. Only a rejected credential or an
//! output failure aborts the run; everything else degrades to fewer rows.

use std::path::PathBuf;

use thiserror::Error;

use crate::client::{ApiError, RateLimitedClient};
use crate::collect::{RepositoryCollector, UserCollector};
use crate::progress::{CollectProgress, ProgressCallback, emit};
use crate::record::{RepositoryTable, UserTable};
use crate::table::{self, REPOSITORIES_FILE, TableError, USERS_FILE};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("the API rejected the token (HTTP {status}); check the configured credential")]
    Credentials { status: u16 },

    #[error("could not verify the token: {0}")]
    CredentialCheck(#[source] ApiError),

    #[error("unexpected HTTP {status} while verifying the token")]
    UnexpectedStatus { status: u16 },

    #[error(transparent)]
    Table(#[from] TableError),
}

/// What to collect and where to put it.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Location filter of the user search.
    pub location: String,
    /// Users need strictly more followers than this.
    pub min_followers: u64,
    /// Directory receiving `users.csv` and `repositories.csv`.
    pub output_dir: PathBuf,
    /// Check the token with `GET /user` before collecting.
    pub verify_credentials: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            location: "Bangalore".to_string(),
            min_followers: 100,
            output_dir: PathBuf::from("data"),
            verify_credentials: true,
        }
    }
}

pub struct Pipeline<'a> {
    client: &'a RateLimitedClient,
    options: PipelineOptions,
    on_progress: Option<&'a ProgressCallback>,
}

impl<'a> Pipeline<'a> {
    pub fn new(client: &'a RateLimitedClient, options: PipelineOptions) -> Self {
        Self {
            client,
            options,
            on_progress: None,
        }
    }

    /// Report progress through `on_progress`.
    pub fn with_progress(mut self, on_progress: Option<&'a ProgressCallback>) -> Self {
        self.on_progress = on_progress;
        self
    }

    /// Where `users.csv` is written.
    pub fn users_path(&self) -> PathBuf {
        self.options.output_dir.join(USERS_FILE)
    }

    /// Where `repositories.csv` is written.
    pub fn repositories_path(&self) -> PathBuf {
        self.options.output_dir.join(REPOSITORIES_FILE)
    }

    /// Confirm the token is accepted by requesting the authenticated user.
    pub async fn verify_credentials(&self) -> Result<(), PipelineError> {
        let response = self
            .client
            .get("/user", &[])
            .await
            .map_err(PipelineError::CredentialCheck)?;

        match response.status {
            200 => {
                let login = response.body.get("login").and_then(|v| v.as_str());
                tracing::info!(login = login.unwrap_or("?"), "Token accepted");
                Ok(())
            }
            401 | 403 => Err(PipelineError::Credentials {
                status: response.status,
            }),
            status => Err(PipelineError::UnexpectedStatus { status }),
        }
    }

    /// Run the whole collection and return both tables as written.
    pub async fn run(&self) -> Result<(UserTable, RepositoryTable), PipelineError> {
        if self.options.verify_credentials {
            self.verify_credentials().await?;
        }

        let users = UserCollector::new(self.client)
            .with_progress(self.on_progress)
            .collect(&self.options.location, self.options.min_followers)
            .await;

        let users_path = self.users_path();
        table::write_users(&users_path, &users)?;
        tracing::debug!(path = %users_path.display(), rows = users.len(), "Wrote user table");
        emit(
            self.on_progress,
            CollectProgress::TableWritten {
                path: users_path,
                rows: users.len(),
            },
        );

        let collector = RepositoryCollector::new(self.client).with_progress(self.on_progress);
        let mut repos: RepositoryTable = Vec::new();
        for (i, user) in users.iter().enumerate() {
            emit(
                self.on_progress,
                CollectProgress::FetchingRepos {
                    login: user.login.clone(),
                    index: i + 1,
                    of: users.len(),
                },
            );
            repos.extend(collector.collect(&user.login).await);
        }

        let repos_path = self.repositories_path();
        table::write_repositories(&repos_path, &repos)?;
        tracing::debug!(path = %repos_path.display(), rows = repos.len(), "Wrote repository table");
        emit(
            self.on_progress,
            CollectProgress::TableWritten {
                path: repos_path,
                rows: repos.len(),
            },
        );

        Ok((users, repos))
    }
}
